//! OpenStack resource lifecycle for StackFlow
//!
//! One creator per resource kind, each implementing
//! [`ResourceCreator`](stackflow_cloud::ResourceCreator): adopt an existing
//! resource by name, create it otherwise, clean it afterwards.
//! [`StackCreator`] additionally adopts the resources its template declared
//! through the `get_*_creators` family.

pub mod deploy;
pub mod flavor;
pub mod graph;
pub mod identity;
pub mod image;
pub mod keypair;
pub mod network;
pub mod reconstruct;
pub mod router;
pub mod stack;
pub mod status;
pub mod vm;
pub mod volume;

pub use deploy::{Deployment, Stage};
pub use flavor::FlavorCreator;
pub use graph::{all_resources, flatten};
pub use identity::{ProjectCreator, UserCreator};
pub use image::ImageCreator;
pub use keypair::KeypairCreator;
pub use network::NetworkCreator;
pub use router::RouterCreator;
pub use stack::StackCreator;
pub use vm::VmInstanceCreator;
pub use volume::{VolumeCreator, VolumeTypeCreator};
