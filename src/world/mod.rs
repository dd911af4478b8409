pub mod camera;
pub mod flats;
pub mod lights;
pub mod sky;

pub use camera::Camera;
pub use flats::{FLAT_DIM, FLAT_LEN, Flat, FlatBank, FlatError, FlatId, NO_FLAT, SKY_FLAT};
pub use lights::{Colormap, LightTables};
pub use sky::{SkyBox, SkyTexture, SkyTransfer};
