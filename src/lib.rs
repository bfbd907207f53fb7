pub mod cli;
pub mod criteria;
pub mod ctx;
pub mod error;
pub mod fanout;
pub mod io;
pub mod pipeline;
pub mod response;
pub mod schema {
    pub mod v1;
}
