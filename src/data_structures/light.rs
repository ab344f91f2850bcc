/// Converts a `0xRRGGBB` colour into linear-ish float channels.
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Uniform light reaching every surface from every direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Omnidirectional light emitted from the node position.
///
/// With `distance == 0.0` the light never cuts off and falls off with
/// `1 / d^decay`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: rgb(hex),
            intensity,
            distance: 0.0,
            decay: 2.0,
        }
    }
}

impl AmbientLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: rgb(hex),
            intensity,
        }
    }
}
