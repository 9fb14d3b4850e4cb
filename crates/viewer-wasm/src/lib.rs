use glam::Vec3;
use serde::Serialize;
use shared::{CanvasRect, PointerButton, PointerEvent};
use viewer_core::{PointerOutcome, Viewer, ViewerSettings};
use wasm_bindgen::prelude::*;

/// Инициализация модуля: panic hook и логирование в консоль браузера
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    tracing::info!("Model viewer WASM initialized");
}

/// Результат обработки события указателя
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PointerResult {
    Ignored,
    Picked {
        element_id: Option<String>,
    },
    BoxSelected {
        names: Vec<String>,
        element_ids: Vec<String>,
    },
}

impl From<PointerOutcome> for PointerResult {
    fn from(outcome: PointerOutcome) -> Self {
        match outcome {
            PointerOutcome::Ignored => PointerResult::Ignored,
            PointerOutcome::Picked(element_id) => PointerResult::Picked { element_id },
            PointerOutcome::BoxSelected(report) => PointerResult::BoxSelected {
                names: report.names,
                element_ids: report.element_ids,
            },
        }
    }
}

/// Один меш для отрисовки на стороне JS
#[derive(Serialize)]
struct DrawItem {
    node: usize,
    name: String,
    /// Мировая матрица, column-major
    matrix: [f32; 16],
    color: [f32; 3],
    emissive: [f32; 3],
}

/// Всё, что нужно хосту для отрисовки кадра
#[derive(Serialize)]
struct Frame {
    view_projection: [f32; 16],
    eye: [f32; 3],
    background: [f32; 3],
    items: Vec<DrawItem>,
    /// Рамка выделения в пикселях: [x0, y0, x1, y1]
    drag_rect: Option<[f32; 4]>,
}

fn flatten(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Просмотрщик модели для браузера
#[wasm_bindgen]
pub struct WebViewer {
    viewer: Viewer,
}

#[wasm_bindgen]
impl WebViewer {
    /// Создаёт просмотрщик; настройки — JSON (`ViewerSettings`) или пусто
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WebViewer, JsError> {
        let settings = match settings_json.as_deref() {
            Some(json) if !json.trim().is_empty() => {
                ViewerSettings::from_json(json).map_err(|e| JsError::new(&e.to_string()))?
            }
            _ => ViewerSettings::default(),
        };
        Ok(Self {
            viewer: Viewer::new(settings),
        })
    }

    /// Границы холста (getBoundingClientRect)
    pub fn set_canvas(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.viewer
            .set_canvas(CanvasRect::new(left, top, width, height));
    }

    /// Загружает модель из байтов .glb / .gltf со встроенными буферами
    pub fn load_gltf(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        self.viewer
            .load_gltf_slice(bytes)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Демонстрационная сцена из двух кубов
    pub fn load_demo(&mut self) {
        self.viewer.load_demo();
    }

    /// Выбор кликом: возвращает ElementID попавшего узла
    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> Option<String> {
        self.viewer.on_pointer_down(x, y)
    }

    /// Событие указателя: `kind` — "down" | "move" | "up", `button` как в DOM,
    /// `buttons` — битовая маска нажатых кнопок
    pub fn handle_pointer(&mut self, kind: &str, x: f32, y: f32, button: i16, buttons: u16) -> Result<JsValue, JsValue> {
        let event = match kind {
            "down" => PointerEvent::down(x, y, PointerButton::from_dom(button)),
            "move" => PointerEvent::moved(x, y, buttons & 1 != 0),
            "up" => PointerEvent::up(x, y, PointerButton::from_dom(button)),
            other => return Err(JsValue::from_str(&format!("Unknown pointer event '{}'", other))),
        };
        to_js(&PointerResult::from(self.viewer.handle_pointer(event)))
    }

    pub fn selected_element_id(&self) -> Option<String> {
        self.viewer.selected_element_id()
    }

    pub fn start_box_selection(&mut self) {
        self.viewer.start_box_selection();
    }

    pub fn stop_box_selection(&mut self) {
        self.viewer.stop_box_selection();
    }

    pub fn start_auto_rotation(&mut self) {
        self.viewer.start_auto_rotation();
    }

    pub fn stop_auto_rotation(&mut self) {
        self.viewer.stop_auto_rotation();
    }

    /// Вызывается на каждый кадр (requestAnimationFrame)
    pub fn update(&mut self) -> bool {
        self.viewer.update()
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) -> bool {
        self.viewer.orbit(dx, dy)
    }

    pub fn zoom(&mut self, delta: f32) -> bool {
        self.viewer.zoom(delta)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        self.viewer.pan(dx, dy)
    }

    /// Имя меша → мировые координаты
    pub fn mesh_positions(&self) -> Result<JsValue, JsValue> {
        to_js(&self.viewer.mesh_positions().to_map())
    }

    pub fn mesh_positions_json(&self) -> String {
        serde_json::to_string(&self.viewer.mesh_positions().to_map()).unwrap_or_default()
    }

    /// Экранные координаты подписей: массив `[name, x, y]`
    pub fn label_positions(&self) -> Result<JsValue, JsValue> {
        let labels: Vec<(String, f32, f32)> = self
            .viewer
            .label_positions()
            .into_iter()
            .map(|(name, p)| (name, p.x, p.y))
            .collect();
        to_js(&labels)
    }

    /// Описание кадра для отрисовки на стороне JS
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        let ctx = self.viewer.context();
        let scene = &ctx.scene;
        let items = scene
            .mesh_nodes()
            .filter_map(|id| {
                let node = scene.get(id)?;
                if !node.visible {
                    return None;
                }
                let material = node.material()?;
                Some(DrawItem {
                    node: id.index(),
                    name: node.name.clone(),
                    matrix: scene.world_matrix(id).to_cols_array(),
                    color: material.color.to_rgb_f32(),
                    emissive: material.effective_emissive().to_rgb_f32(),
                })
            })
            .collect();

        let frame = Frame {
            view_projection: ctx.camera.view_projection(ctx.aspect()).to_cols_array(),
            eye: ctx.camera.eye_position().to_array(),
            background: ctx.background.to_rgb_f32(),
            items,
            drag_rect: self
                .viewer
                .box_drag_rect()
                .map(|(a, b)| [a.x, a.y, b.x, b.y]),
        };
        to_js(&frame)
    }

    /// Буферы геометрии меша: `[positions, normals, indices]`
    pub fn mesh_buffers(&self, node: usize) -> Option<js_sys::Array> {
        let scene = self.viewer.scene();
        let id = scene.mesh_nodes().find(|id| id.index() == node)?;
        let geometry = scene.get(id)?.geometry()?;

        let positions = js_sys::Float32Array::from(flatten(&geometry.positions).as_slice());
        let normals = js_sys::Float32Array::from(flatten(&geometry.normals).as_slice());
        let indices = js_sys::Uint32Array::from(geometry.indices.as_slice());
        Some(js_sys::Array::of3(&positions, &normals, &indices))
    }

    /// Снять все подсветки и остановить режимы
    pub fn end(&mut self) {
        self.viewer.end();
    }
}
