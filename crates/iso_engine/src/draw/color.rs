//! Colors and per-category palettes

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::foundation::math::utils::lerp;

/// Linear RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create an opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from a `0xRRGGBB` literal
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Pack into `0xRRGGBB`, dropping alpha
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Per-channel linear interpolation (alpha included)
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
            a: lerp(self.a, other.a, t),
        }
    }

    /// Component-wise multiply of the RGB channels, keeping this alpha
    pub fn modulate(self, tint: Self) -> Self {
        Self {
            r: self.r * tint.r,
            g: self.g * tint.g,
            b: self.b * tint.b,
            a: self.a,
        }
    }

    /// Scale RGB brightness, keeping alpha
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: (self.r * factor).clamp(0.0, 1.0),
            g: (self.g * factor).clamp(0.0, 1.0),
            b: (self.b * factor).clamp(0.0, 1.0),
            a: self.a,
        }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// What a sprite part is painted as; resolved against a [`Palette`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Exposed skin (face, hands)
    Skin,
    /// Hair on top of the head
    Hair,
    /// Upper body clothing, varies by category
    Shirt,
    /// Trousers
    Pants,
    /// Footwear
    Shoes,
    /// Eyes and outlines
    Outline,
    /// Building wall facing the viewer's left
    Wall,
    /// Building wall facing the viewer's right (shaded)
    WallShade,
    /// Roof, varies by category
    Roof,
    /// Unlit window glass
    Window,
    /// Entrance
    Door,
}

/// Role-to-color table for one entity or structure category
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Skin tone
    pub skin: Color,
    /// Hair color
    pub hair: Color,
    /// Shirt color
    pub shirt: Color,
    /// Trousers color
    pub pants: Color,
    /// Shoe color
    pub shoes: Color,
    /// Outline/eye color
    pub outline: Color,
    /// Lit wall color
    pub wall: Color,
    /// Shaded wall color
    pub wall_shade: Color,
    /// Roof color
    pub roof: Color,
    /// Dark window color
    pub window: Color,
    /// Door color
    pub door: Color,
}

const SHIRT_COLORS: [u32; 8] = [
    0x3B_82_F6, 0xEF_44_44, 0x10_B9_81, 0xF5_9E_0B, 0x8B_5C_F6, 0xEC_48_99, 0x14_B8_A6, 0x64_74_8B,
];

const HAIR_COLORS: [u32; 4] = [0x2D_1B_0E, 0x6B_3A_1F, 0xD4_A0_50, 0x1F_1F_1F];

fn category_hash(category: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    category.to_ascii_lowercase().hash(&mut hasher);
    hasher.finish()
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            skin: Color::from_hex(0xF1_C2_7D),
            hair: Color::from_hex(HAIR_COLORS[0]),
            shirt: Color::from_hex(SHIRT_COLORS[0]),
            pants: Color::from_hex(0x37_41_51),
            shoes: Color::from_hex(0x1F_29_37),
            outline: Color::from_hex(0x11_11_11),
            wall: Color::from_hex(0xE5_E7_EB),
            wall_shade: Color::from_hex(0xB8_BC_C4),
            roof: Color::from_hex(0x9C_A3_AF),
            window: Color::from_hex(0x33_41_55),
            door: Color::from_hex(0x78_35_0F),
        }
    }
}

impl Palette {
    /// Palette for a mobile entity; shirt and hair are picked from the category
    pub fn for_entity(category: &str) -> Self {
        let hash = category_hash(category);
        Self {
            shirt: Color::from_hex(SHIRT_COLORS[(hash % SHIRT_COLORS.len() as u64) as usize]),
            hair: Color::from_hex(HAIR_COLORS[((hash >> 8) % HAIR_COLORS.len() as u64) as usize]),
            ..Self::default()
        }
    }

    /// Palette for a structure; known location types get their own roof and walls
    pub fn for_structure(category: &str) -> Self {
        let (roof, wall) = match category.to_ascii_lowercase().as_str() {
            "apartment" => (0x7C_3A_ED, 0xED_E9_FE),
            "house" => (0xB9_1C_1C, 0xFE_F3_C7),
            "cafe" => (0x92_40_0E, 0xFD_E6_8A),
            "restaurant" => (0xDC_26_26, 0xFE_E2_E2),
            "supermarket" | "mall" => (0x05_96_69, 0xD1_FA_E5),
            "office" => (0x1E_40_AF, 0xDB_EA_FE),
            "factory" => (0x57_53_4E, 0xD6_D3_D1),
            "school" | "library" => (0xB4_53_09, 0xFF_ED_D5),
            "hospital" => (0xE1_1D_48, 0xFF_FF_FF),
            "park" | "plaza" => (0x16_A3_4A, 0xBB_F7_D0),
            "bank" => (0x4B_55_63, 0xF3_F4_F6),
            "gym" | "barbershop" => (0x0E_74_90, 0xCF_FA_FE),
            _ => {
                let hash = category_hash(category);
                (SHIRT_COLORS[(hash % SHIRT_COLORS.len() as u64) as usize], 0xE5_E7_EB)
            }
        };
        let wall = Color::from_hex(wall);
        Self {
            roof: Color::from_hex(roof),
            wall,
            wall_shade: wall.scaled(0.8),
            ..Self::default()
        }
    }

    /// Look up the color for a role
    pub fn resolve(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Skin => self.skin,
            ColorRole::Hair => self.hair,
            ColorRole::Shirt => self.shirt,
            ColorRole::Pants => self.pants,
            ColorRole::Shoes => self.shoes,
            ColorRole::Outline => self.outline,
            ColorRole::Wall => self.wall,
            ColorRole::WallShade => self.wall_shade,
            ColorRole::Roof => self.roof,
            ColorRole::Window => self.window,
            ColorRole::Door => self.door,
        }
    }
}
