pub mod k8s;
pub mod kube_client;

pub use k8s::KubePodClient;
pub use kube_client::init_kube_client;
