pub mod common;
pub mod domain;
pub mod equipment;
pub mod numerics;
pub mod pipeline;
pub mod response;
