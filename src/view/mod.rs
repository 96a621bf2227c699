mod camera;
mod command;
mod constants;
mod frame_resource;
mod projector;
mod timeline;
mod upload_buffer;

pub use camera::*;
pub use command::*;
pub use constants::*;
pub use frame_resource::*;
pub use projector::*;
pub use timeline::*;
pub use upload_buffer::*;
