pub mod email;

pub use email::{
    EmailConfig, EmailError, EmailMessage, Encryption, Engine, Mail, SendResponse, current_client,
    new_engine,
};
