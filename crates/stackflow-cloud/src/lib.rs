//! StackFlow platform layer
//!
//! Binding traits for each platform service, snapshot handles for remote
//! resources, the status poller every wait goes through, and the creator
//! contract implemented per resource kind.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            stackflow-openstack               │
//! │   creators · stack manager · reconstruction  │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │               stackflow-cloud                │
//! │  ResourceCreator  StatusPoller  CleanupReport│
//! │  ComputeApi NetworkApi ImageApi ... (Cloud)  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod creator;
pub mod error;
pub mod handle;
pub mod poller;
pub mod report;

pub use api::{
    Cloud, ComputeApi, IdentityApi, ImageApi, NetworkApi, OrchestrationApi, PortFilter,
    ServerRequest, VolumeApi,
};
pub use creator::{Lifecycle, ResourceCreator};
pub use error::{CloudError, Result, ignore_not_found, optional};
pub use handle::*;
pub use poller::{POLL_INTERVAL, StatusPoller};
pub use report::{CleanupFailure, CleanupReport};
