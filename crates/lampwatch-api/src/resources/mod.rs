// Resource API facade
//
// One file per backend namespace. Each method is a fixed path and
// parameter shape over `ApiClient::request`; none of them add behaviour.

pub mod control;
pub mod device;
pub mod lamp;
pub mod monitor;
pub mod user;
