//! Default configuration dump

use anyhow::Result;
use petalfall_sim::SimConfig;
use petalfall_tree::TreeConfig;

pub fn run(tree: bool) -> Result<()> {
    let text = if tree {
        toml::to_string_pretty(&TreeConfig::default())?
    } else {
        SimConfig::default().to_toml_string()?
    };
    print!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dumps_parse_back() {
        let sim = SimConfig::default().to_toml_string().unwrap();
        assert_eq!(SimConfig::from_toml_str(&sim).unwrap(), SimConfig::default());

        let tree = toml::to_string_pretty(&TreeConfig::default()).unwrap();
        assert_eq!(TreeConfig::from_toml_str(&tree).unwrap(), TreeConfig::default());
    }
}
