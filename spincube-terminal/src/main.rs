/// spincube terminal demo - rotating textured cube
///
/// Every configuration key of the web component is available as a flag;
/// `--config` reads a JSON document first and flags override it.
use anyhow::Context;
use clap::Parser;
use spincube_core::{Color, SceneConfig};
use spincube_terminal::TerminalApp;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spincube", about = "Render a spinning textured cube in the terminal")]
struct Cli {
    /// JSON configuration document (camelCase keys)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Radians added to the X rotation every frame
    #[arg(long, allow_negative_numbers = true)]
    rotation_speed_x: Option<f32>,
    /// Radians added to the Y rotation every frame
    #[arg(long, allow_negative_numbers = true)]
    rotation_speed_y: Option<f32>,
    /// Cube edge length
    #[arg(long)]
    size: Option<f32>,
    /// Texture image path
    #[arg(long)]
    texture: Option<String>,
    /// Camera distance on the Z axis
    #[arg(long, allow_negative_numbers = true)]
    camera_z: Option<f32>,
    /// Vertical field of view in degrees
    #[arg(long)]
    field_of_view: Option<f32>,
    #[arg(long)]
    near_clipping: Option<f32>,
    #[arg(long)]
    far_clipping: Option<f32>,
    /// Background color, e.g. #000000
    #[arg(long, value_parser = parse_color)]
    background: Option<Color>,
    /// Outline color, e.g. #000000
    #[arg(long, value_parser = parse_color)]
    outline_color: Option<Color>,
    /// Cube surface color, multiplied with the texture
    #[arg(long, value_parser = parse_color)]
    material_color: Option<Color>,
    /// Do not draw the edge outline
    #[arg(long)]
    no_outline: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_color(text: &str) -> Result<Color, String> {
    Color::parse(text).map_err(|err| err.to_string())
}

impl Cli {
    fn scene_config(&self) -> anyhow::Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SceneConfig::default(),
        };

        let cube = &mut config.cube;
        let camera = &mut config.camera;
        let stage = &mut config.stage;
        override_with(&mut cube.rotation_speed_x, self.rotation_speed_x);
        override_with(&mut cube.rotation_speed_y, self.rotation_speed_y);
        override_with(&mut cube.size, self.size);
        override_with(&mut cube.texture, self.texture.clone());
        override_with(&mut camera.camera_z, self.camera_z);
        override_with(&mut camera.field_of_view, self.field_of_view);
        override_with(&mut camera.near_clipping, self.near_clipping);
        override_with(&mut camera.far_clipping, self.far_clipping);
        override_with(&mut stage.background, self.background);
        override_with(&mut stage.outline_color, self.outline_color);
        override_with(&mut stage.material_color, self.material_color);
        if self.no_outline {
            stage.outline = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_secs()
        .init();

    let config = cli.scene_config()?;

    let mut app = TerminalApp::new(&config)?;
    app.run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "spincube",
            "--rotation-speed-x",
            "0.5",
            "--camera-z",
            "12",
            "--background",
            "#102030",
            "--material-color",
            "#f80",
            "--no-outline",
        ]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.cube.rotation_speed_x, 0.5);
        assert_eq!(config.cube.rotation_speed_y, 0.01);
        assert_eq!(config.camera.camera_z, 12.0);
        assert_eq!(config.stage.background, Color::new(0x10, 0x20, 0x30));
        assert_eq!(config.stage.material_color, Color::new(0xff, 0x88, 0x00));
        assert!(!config.stage.outline);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = Cli::parse_from(["spincube", "--size", "0"]);
        assert!(cli.scene_config().is_err());
        assert!(Cli::try_parse_from(["spincube", "--background", "blue"]).is_err());
    }
}
