// src/presets.rs

/// A canned extraction template for a common training-log signal.
/// These are data, not logic: `ExtractorRegistry::add_preset` seeds a
/// regular rule from one, after which it behaves like any other rule.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub pattern: &'static str,
}

/// The fixed catalogue. Patterns match English and Chinese log keywords;
/// the second capture group carries the interesting value.
pub const PRESETS: &[Preset] = &[
    Preset {
        key: "error",
        name: "错误信息",
        pattern: r"(error|错误|失败|failed|exception|Error|ERROR)[:\s]*([^\n\r]*)",
    },
    Preset {
        key: "warning",
        name: "警告信息",
        pattern: r"(warning|warn|警告|注意|Warning|WARN)[:\s]*([^\n\r]*)",
    },
    Preset {
        key: "progress",
        name: "训练进度",
        pattern: r"(\d+(?:\.\d+)?%)|(\d+/\d+)|进度[:\s]*(\d+(?:\.\d+)?%?)",
    },
    Preset {
        key: "epoch",
        name: "训练轮次",
        pattern: r"(epoch|轮次|Epoch)[:\s]*(\d+)",
    },
    Preset {
        key: "loss",
        name: "损失值",
        pattern: r"(loss|损失|Loss)[:\s]*([0-9]+\.?[0-9]*(?:[eE][+-]?[0-9]+)?)",
    },
    Preset {
        key: "accuracy",
        name: "准确率",
        pattern: r"(accuracy|acc|准确率|Accuracy|ACC)[:\s]*([0-9.]+%?)",
    },
];

/// Look up a preset by key.
pub fn find(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}

/// Comma-joined key list, for error messages.
pub fn available_keys() -> String {
    PRESETS
        .iter()
        .map(|p| p.key)
        .collect::<Vec<_>>()
        .join(", ")
}
