//! Camera controllers: free-fly look and movement, and a smoothed follow
//! camera that circles a selected planet.

pub mod controller;
pub mod follow_camera;
pub mod free_fly_camera;

pub use controller::{CameraController, CameraMode, CameraPose};
pub use follow_camera::{FollowCamera, follow_camera_system};
pub use free_fly_camera::{FlyInput, FreeFlyCamera, free_fly_look_system, free_fly_move_system};
