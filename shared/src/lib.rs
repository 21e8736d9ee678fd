// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("session store: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
