use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    Ru,
    En,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=Ru (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::En,
        _ => Lang::Ru,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::Ru => 0,
            Lang::En => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Toolbar ─────────────────────────────────────────
        "tb.open" => if ru { "Открыть модель..." } else { "Open model..." },
        "tb.open_title" => if ru { "Открыть glTF модель" } else { "Open glTF model" },
        "tb.demo" => if ru { "Демо" } else { "Demo" },
        "tb.box_select" => if ru { "Рамка" } else { "Box select" },
        "tb.auto_rotate" => if ru { "Вращение" } else { "Auto-rotate" },
        "tb.labels" => if ru { "Подписи" } else { "Labels" },
        "tb.reset_camera" => if ru { "Сбросить камеру" } else { "Reset camera" },
        "tb.language" => if ru { "Язык" } else { "Language" },

        "tip.open" => if ru { "Загрузить .glb или .gltf (Ctrl+O)" } else { "Load a .glb or .gltf file (Ctrl+O)" },
        "tip.demo" => if ru { "Показать два демонстрационных куба" } else { "Show the two demo boxes" },
        "tip.box_select" => if ru { "Выделение рамкой (B)" } else { "Drag a rectangle to select meshes (B)" },
        "tip.auto_rotate" => if ru { "Автоматическое вращение модели (R)" } else { "Spin the model about Y (R)" },
        "tip.labels" => if ru { "Подписи мешей (L)" } else { "Mesh name labels (L)" },
        "tip.reset_camera" => if ru { "Вернуть камеру в исходное положение (Home)" } else { "Move the camera back home (Home)" },

        // ── Parts panel ─────────────────────────────────────
        "parts.title" => if ru { "Модель" } else { "Model" },
        "parts.no_model" => if ru { "Модель не загружена." } else { "No model loaded." },
        "parts.meshes" => if ru { "Меши" } else { "Meshes" },
        "parts.selected" => if ru { "Выбрано" } else { "Selected" },
        "parts.element_id" => if ru { "ElementID" } else { "ElementID" },
        "parts.none" => if ru { "(нет)" } else { "(none)" },
        "parts.box_result" => if ru { "Рамочное выделение" } else { "Box selection" },
        "parts.box_empty" => if ru { "Ничего не выделено." } else { "Nothing selected." },

        // ── Status bar ──────────────────────────────────────
        "status.ready" => if ru { "Готово" } else { "Ready" },
        "status.loading" => if ru { "Загрузка" } else { "Loading" },
        "status.meshes" => if ru { "Мешей" } else { "Meshes" },
        "status.selected" => if ru { "Выбран" } else { "Selected" },
        "status.boxed" => if ru { "В рамке" } else { "In box" },
        "status.box_mode" => if ru { "Режим рамки" } else { "Box mode" },
        "status.nav_hint" => if ru {
            "ЛКМ: выбор/вращение | ПКМ: панорама | Колесо: масштаб"
        } else {
            "LMB: select/orbit | RMB: pan | Scroll: zoom"
        },
        "status.box_hint" => if ru {
            "Тяните ЛКМ, чтобы выделить меши рамкой"
        } else {
            "Drag with LMB to select meshes"
        },

        _ => "???",
    }
}
