//! `fetap phone-book`: edit the number assignments

use crate::cli::PhoneBookCommand;
use crate::config::FetapConfig;
use anyhow::Context;
use fetap_phone_book::{PhoneBook, PhoneBookError};

pub fn execute(config: &FetapConfig, command: PhoneBookCommand) -> anyhow::Result<()> {
    let book = PhoneBook::from_config(&config.phone_book).with_context(|| {
        format!(
            "Failed to open phone book {}",
            config.phone_book.path.display()
        )
    })?;

    match command {
        PhoneBookCommand::List => {
            for (number, address) in book.list_all()? {
                println!("{}  {}", number, address);
            }
        }
        PhoneBookCommand::Add {
            number,
            address,
            force,
        } => match book.insert(number, &address, force) {
            Ok(()) => println!("{}  {}", number, address),
            Err(PhoneBookError::SimilarNumberExists { similar, .. }) => {
                let similar: Vec<String> = similar.iter().map(ToString::to_string).collect();
                anyhow::bail!(
                    "{} is easily misdialed as {}, pick another number or pass --force",
                    number,
                    similar.join(", ")
                );
            }
            Err(e) => return Err(e.into()),
        },
        PhoneBookCommand::Remove { number } => {
            let address = book.remove_number(&number)?;
            println!("Removed {}  {}", number, address);
        }
    }
    Ok(())
}
