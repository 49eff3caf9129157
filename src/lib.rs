pub mod config;
pub mod lights;
pub mod server;

pub mod prelude {
    pub use crate::{config::*, lights::*, server::*};
}
