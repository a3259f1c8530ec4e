//! Pod model, deletion policy and the eligibility rules applied to each pod.

pub mod eligibility;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod pod;
pub mod policy;
pub mod traits;

pub use eligibility::evaluate;
pub use eligibility::Decision;
pub use eligibility::SkipCause;
pub use error::PodClientError;
pub use pod::ContainerState;
pub use pod::PodPhase;
pub use pod::PodSnapshot;
pub use policy::AcceptedReasons;
pub use policy::Policy;
pub use traits::PodDeleter;
pub use traits::PodLister;
pub use traits::SystemClock;
pub use traits::TimeSource;
