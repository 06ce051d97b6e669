//! Scene state for the orrery: orbiting bodies, the free-look camera and
//! the frame clock that advances them.

pub mod body;
pub mod camera;
pub mod clock;
pub mod state;

pub use body::{BodyTransform, OrbitingBody};
pub use camera::{FreeLookCamera, PerspectiveProjection, skybox_view};
pub use clock::FrameClock;
pub use state::SceneState;
