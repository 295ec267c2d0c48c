//! Command line and environment configuration for the server binary.

use std::net::IpAddr;

use clap::{Parser, ValueEnum};

use crate::connection::StoreSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "bookshelf", version, about = "Serve the book catalog over HTML and JSON")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BOOKSHELF_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Host name shown in the startup message
    #[arg(long, env = "HOSTNAME", default_value = "localhost")]
    pub hostname: String,

    /// Document store backend
    #[arg(long, env = "BOOKSHELF_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// MongoDB connection string, credentials included
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database holding the books collection
    #[arg(long, env = "MONGODB_DATABASE", default_value = "bookshelf")]
    pub mongodb_database: String,
}

impl Config {
    pub fn store_settings(&self) -> StoreSettings {
        match self.store {
            StoreKind::Memory => StoreSettings::Memory,
            StoreKind::Mongodb => StoreSettings::MongoDb {
                uri: self.mongodb_uri.clone(),
                database: self.mongodb_database.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_select_mongodb() {
        let config = Config::try_parse_from([
            "bookshelf",
            "--store",
            "mongodb",
            "--mongodb-uri",
            "mongodb://db:27017",
            "--mongodb-database",
            "library",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.store_settings(),
            StoreSettings::MongoDb { uri: "mongodb://db:27017".into(), database: "library".into() }
        );
    }

    #[test]
    fn test_rejects_unknown_store() {
        assert!(Config::try_parse_from(["bookshelf", "--store", "firestore"]).is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;

        Config::command().debug_assert();
    }
}
