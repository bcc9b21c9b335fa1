//! Level definition loading

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use midnight_game::LevelDefinition;
use tracing::info;

/// The level shipped with the game
pub const DEFAULT_LEVEL: &str = include_str!("../assets/midnight_walk.toml");

/// Parse and validate a level definition
pub fn parse(content: &str) -> Result<LevelDefinition> {
    let definition: LevelDefinition =
        toml::from_str(content).context("Failed to parse level definition")?;
    definition.validate().context("Invalid level definition")?;
    Ok(definition)
}

/// Load a level from disk, or the built-in level when no path is given
pub fn load(path: Option<&Path>) -> Result<LevelDefinition> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read level file {:?}", path))?;
            let definition = parse(&content)?;
            info!("Loaded level from {:?}", path);
            Ok(definition)
        }
        None => {
            info!("Using built-in level");
            parse(DEFAULT_LEVEL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midnight_game::{MaskType, NpcId};

    #[test]
    fn test_built_in_level_is_valid() {
        let definition = load(None).unwrap();
        let ids: Vec<_> = definition.npcs.iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, vec!["lamp_keeper", "old_man", "stranger", "child"]);

        for npc in definition.npcs.iter().filter(|n| n.requires_mask) {
            let set = npc.mask_dialogue.as_ref().unwrap();
            assert!(set.is_complete(), "{} is missing a variant", npc.id);
            for mask in MaskType::WEARABLE {
                assert!(set.script_for(mask).unwrap().validate().is_ok());
            }
        }
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let err = parse("[level]\nrequired_interactions = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("required_interactions"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load(Some(Path::new("/nonexistent/level.toml"))).unwrap_err();
        assert!(err.to_string().contains("level.toml"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let src = r#"
            [[npc]]
            id = ""
            name = "Nobody"
        "#;
        assert!(parse(src).is_err());
        assert!(NpcId::new("").is_empty());
    }
}
