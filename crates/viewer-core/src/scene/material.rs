use std::sync::Arc;

use shared::Color;

/// Shared material handle. Several nodes may point at the same material;
/// highlighting always replaces the handle, never the pointee.
pub type MaterialRef = Arc<Material>;

/// Surface material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    /// Base color
    pub color: Color,
    /// Emissive channel; `None` for unlit materials that have no such channel
    pub emissive: Option<Color>,
}

impl Material {
    /// Lit material with a (black) emissive channel
    pub fn standard(color: Color) -> Self {
        Self {
            name: None,
            color,
            emissive: Some(Color::BLACK),
        }
    }

    /// Unlit material without an emissive channel
    pub fn basic(color: Color) -> Self {
        Self {
            name: None,
            color,
            emissive: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_emissive(&self) -> bool {
        self.emissive.is_some()
    }

    /// Copy of this material with the emissive color replaced.
    /// Returns `None` when the material has no emissive channel.
    pub fn with_emissive(&self, color: Color) -> Option<Material> {
        self.emissive?;
        let mut copy = self.clone();
        copy.emissive = Some(color);
        Some(copy)
    }

    /// Emissive color for rendering, black when the channel is missing
    pub fn effective_emissive(&self) -> Color {
        self.emissive.unwrap_or(Color::BLACK)
    }
}

/// Clone `material`, set the clone's emissive color and wrap it in a fresh handle.
pub fn emissive_copy(material: &MaterialRef, color: Color) -> Option<MaterialRef> {
    material.with_emissive(color).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_emissive_leaves_original_untouched() {
        let original = Arc::new(Material::standard(Color::WHITE));
        let copy = emissive_copy(&original, Color::CLICK_HIGHLIGHT).unwrap();
        assert_eq!(original.emissive, Some(Color::BLACK));
        assert_eq!(copy.emissive, Some(Color::CLICK_HIGHLIGHT));
        assert!(!Arc::ptr_eq(&original, &copy));
    }

    #[test]
    fn test_basic_material_has_no_emissive() {
        let m = Arc::new(Material::basic(Color::from_hex(0x0000FF)));
        assert!(!m.has_emissive());
        assert!(emissive_copy(&m, Color::BOX_HIGHLIGHT).is_none());
        assert_eq!(m.effective_emissive(), Color::BLACK);
    }
}
