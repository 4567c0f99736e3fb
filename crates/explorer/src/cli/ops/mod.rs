pub mod browse;
pub mod get;
pub mod init;
pub mod ls;
pub mod servers;
pub mod tree;
pub mod version;

pub use browse::Browse;
pub use get::Get;
pub use init::Init;
pub use ls::Ls;
pub use servers::Servers;
pub use tree::Tree;
pub use version::Version;
