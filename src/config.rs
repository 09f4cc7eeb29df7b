use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_particles")]
    pub particles: usize,

    #[serde(default = "default_color_depth")]
    pub color_depth: u8,

    #[serde(default = "default_menu_frame_width")]
    pub menu_frame_width: u32,

    #[serde(default = "default_level_frame_width")]
    pub level_frame_width: u32,

    #[serde(default = "default_palette_width")]
    pub palette_width: u32,

    #[serde(default = "default_zoom_in")]
    pub zoom_in: f32,

    #[serde(default = "default_zoom_out")]
    pub zoom_out: f32,

    #[serde(default = "default_scroll_step")]
    pub scroll_step: f32,

    #[serde(default = "default_menu_pad_fraction")]
    pub menu_pad_fraction: f32,

    #[serde(default = "default_hover_duration")]
    pub hover_duration: f32,

    #[serde(default = "default_transition_duration")]
    pub transition_duration: f32,

    #[serde(default = "default_theme")]
    pub theme: Theme,

    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub menu_border: [u8; 3],
    pub level_border: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particles: default_particles(),
            color_depth: default_color_depth(),
            menu_frame_width: default_menu_frame_width(),
            level_frame_width: default_level_frame_width(),
            palette_width: default_palette_width(),
            zoom_in: default_zoom_in(),
            zoom_out: default_zoom_out(),
            scroll_step: default_scroll_step(),
            menu_pad_fraction: default_menu_pad_fraction(),
            hover_duration: default_hover_duration(),
            transition_duration: default_transition_duration(),
            theme: default_theme(),
            fps_cap: default_fps_cap(),
        }
    }
}

fn default_particles() -> usize {
    5000
}

fn default_color_depth() -> u8 {
    20
}

fn default_menu_frame_width() -> u32 {
    200
}

fn default_level_frame_width() -> u32 {
    300
}

fn default_palette_width() -> u32 {
    50
}

fn default_zoom_in() -> f32 {
    1.5
}

fn default_zoom_out() -> f32 {
    0.6
}

fn default_scroll_step() -> f32 {
    25.0
}

fn default_menu_pad_fraction() -> f32 {
    0.0625
}

fn default_hover_duration() -> f32 {
    0.5
}

fn default_transition_duration() -> f32 {
    3.0
}

fn default_theme() -> Theme {
    Theme {
        menu_border: [34, 34, 34],
        level_border: [0, 0, 0],
    }
}

fn default_fps_cap() -> u32 {
    60
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("tintile").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("tintile");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_the_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.particles, 5000);
        assert_eq!(config.color_depth, 20);
        assert_eq!(config.theme.menu_border, [34, 34, 34]);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: Config = toml::from_str("particles = 1200\nzoom_in = 2.0\n").unwrap();
        assert_eq!(config.particles, 1200);
        assert_eq!(config.zoom_in, 2.0);
        assert_eq!(config.scroll_step, 25.0);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.particles, config.particles);
        assert_eq!(back.transition_duration, config.transition_duration);
        assert_eq!(back.theme.menu_border, config.theme.menu_border);
    }
}
