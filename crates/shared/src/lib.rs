use std::fmt;

use serde::{Deserialize, Serialize};

/// Внешний идентификатор элемента модели (`userData.ElementID` в glTF extras)
pub type ElementId = String;

/// Ключ в glTF extras, из которого читается идентификатор элемента
pub const ELEMENT_ID_KEY: &str = "ElementID";

// ============================================================================
// Цвета
// ============================================================================

/// RGB-цвет (8 бит на канал), сериализуется как строка `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xFFFFFF);

    /// Цвет подсветки при выборе кликом
    pub const CLICK_HIGHLIGHT: Color = Color::from_hex(0x00BFFF);
    /// Цвет подсветки при рамочном выделении
    pub const BOX_HIGHLIGHT: Color = Color::from_hex(0x00FF00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Цвет из числа вида `0xRRGGBB`
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Цвет из линейных компонент 0.0..=1.0 (glTF factors)
    pub fn from_rgb_f32(rgb: [f32; 3]) -> Self {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]))
    }

    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Разбор строки `#RRGGBB` (решётка необязательна)
    pub fn parse(s: &str) -> Result<Self, String> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("expected 6 hex digits, got '{s}'"));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("invalid color '{s}': {e}"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

// ============================================================================
// Позиции мешей (для подписей)
// ============================================================================

/// Мировые координаты меша
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MeshPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MeshPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for MeshPosition {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

// ============================================================================
// События указателя
// ============================================================================

/// Кнопка указателя (номера как в DOM `PointerEvent.button`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other,
}

impl PointerButton {
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// Тип события указателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// Событие указателя в экранных координатах (пиксели)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    /// Основная кнопка удерживается (для `Move`)
    #[serde(default)]
    pub primary_down: bool,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32, button: PointerButton) -> Self {
        Self {
            kind: PointerEventKind::Down,
            x,
            y,
            button,
            primary_down: button == PointerButton::Primary,
        }
    }

    pub fn moved(x: f32, y: f32, primary_down: bool) -> Self {
        Self {
            kind: PointerEventKind::Move,
            x,
            y,
            button: PointerButton::Other,
            primary_down,
        }
    }

    pub fn up(x: f32, y: f32, button: PointerButton) -> Self {
        Self {
            kind: PointerEventKind::Up,
            x,
            y,
            button,
            primary_down: false,
        }
    }
}

// ============================================================================
// Холст
// ============================================================================

/// Границы холста в экранных координатах
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Холст нулевого размера — камера ещё не готова
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Экранные координаты → нормализованные координаты устройства [-1, 1]
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<[f32; 2]> {
        if self.is_degenerate() {
            return None;
        }
        Some([
            (x - self.left) / self.width * 2.0 - 1.0,
            -((y - self.top) / self.height) * 2.0 + 1.0,
        ])
    }

    /// NDC → экранные координаты
    pub fn from_ndc(&self, ndc: [f32; 2]) -> [f32; 2] {
        [
            self.left + (ndc[0] + 1.0) * 0.5 * self.width,
            self.top + (1.0 - ndc[1]) * 0.5 * self.height,
        ]
    }
}

impl Default for CanvasRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// ============================================================================
// Загрузка и результаты выделения
// ============================================================================

/// Прогресс загрузки модели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    /// Доля загруженного 0.0..=1.0, если известен общий размер
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.loaded as f64 / total as f64).min(1.0) as f32),
            None => None,
        }
    }
}

/// Итог рамочного выделения — передаётся внешней системе
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoxSelectionReport {
    /// Имена выделенных мешей в порядке запроса
    pub names: Vec<String>,
    /// Идентификаторы элементов (только у узлов, где он есть)
    pub element_ids: Vec<ElementId>,
}

impl BoxSelectionReport {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex(0x00BFFF);
        assert_eq!(c, Color::new(0, 191, 255));
        assert_eq!(c.to_hex(), 0x00BFFF);
        assert_eq!(c.to_string(), "#00BFFF");
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#00ff00").unwrap(), Color::BOX_HIGHLIGHT);
        assert_eq!(Color::parse("dae3e6").unwrap(), Color::from_hex(0xDAE3E6));
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
        assert!(Color::parse("#+12345").is_err());
        assert!(Color::parse("-12345").is_err());
    }

    #[test]
    fn test_mesh_position_from_array() {
        assert_eq!(MeshPosition::from([1.0, -2.0, 0.5]), MeshPosition::new(1.0, -2.0, 0.5));
        let json = serde_json::to_string(&MeshPosition::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"z":3.0}"#);
    }

    #[test]
    fn test_color_serde_as_string() {
        let json = serde_json::to_string(&Color::CLICK_HIGHLIGHT).unwrap();
        assert_eq!(json, "\"#00BFFF\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::CLICK_HIGHLIGHT);
    }

    #[test]
    fn test_canvas_to_ndc_corners() {
        let canvas = CanvasRect::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(canvas.to_ndc(10.0, 20.0), Some([-1.0, 1.0]));
        assert_eq!(canvas.to_ndc(210.0, 120.0), Some([1.0, -1.0]));
        assert_eq!(canvas.to_ndc(110.0, 70.0), Some([0.0, 0.0]));
    }

    #[test]
    fn test_canvas_ndc_inverse() {
        let canvas = CanvasRect::new(10.0, 20.0, 200.0, 100.0);
        let ndc = canvas.to_ndc(60.0, 45.0).unwrap();
        let back = canvas.from_ndc(ndc);
        assert!((back[0] - 60.0).abs() < 1e-4);
        assert!((back[1] - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_canvas_has_no_ndc() {
        let canvas = CanvasRect::default();
        assert!(canvas.is_degenerate());
        assert_eq!(canvas.to_ndc(1.0, 1.0), None);
    }

    #[test]
    fn test_pointer_button_from_dom() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other);
    }

    #[test]
    fn test_load_progress_fraction() {
        let p = LoadProgress { loaded: 50, total: Some(200) };
        assert_eq!(p.fraction(), Some(0.25));
        assert_eq!(LoadProgress { loaded: 5, total: None }.fraction(), None);
    }
}
