use crate::app::report::OutputFormat;
use crate::core::scorer::ScoringWeights;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RecError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assets: AssetsConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory with the asset files, or a `.zip` bundle containing them.
    pub path: String,
    pub catalog_file: String,
    pub factor_model_file: String,
    pub neighbor_model_file: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            path: "models".to_string(),
            catalog_file: "catalog.csv".to_string(),
            factor_model_file: "svd_model.json".to_string(),
            neighbor_model_file: "knn_model.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weight_a: f64,
    pub weight_b: f64,
    /// Per-call predictor budget; a slower call counts as unavailable.
    pub call_budget_ms: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let weights = ScoringWeights::default();
        Self {
            weight_a: weights.weight_a,
            weight_b: weights.weight_b,
            call_budget_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_top_n: usize,
    pub min_top_n: usize,
    pub max_top_n: usize,
    pub similar_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            min_top_n: 5,
            max_top_n: 20,
            similar_top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RecError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BOOKREC_ASSETS})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RecError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            weight_a: self.scoring.weight_a,
            weight_b: self.scoring.weight_b,
        }
    }

    pub fn is_archive(&self) -> bool {
        Path::new(&self.assets.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("assets.path", &self.assets.path)?;
        validate_non_empty_string("assets.catalog_file", &self.assets.catalog_file)?;
        validate_file_extensions("assets.catalog_file", &[self.assets.catalog_file.as_str()], &["csv"])?;
        validate_file_extensions(
            "assets.model_files",
            &[
                self.assets.factor_model_file.as_str(),
                self.assets.neighbor_model_file.as_str(),
            ],
            &["json"],
        )?;

        self.weights().validate()?;
        if let Some(budget) = self.scoring.call_budget_ms {
            validate_positive_number("scoring.call_budget_ms", budget as usize, 1)?;
        }

        let ranking = &self.ranking;
        validate_positive_number("ranking.min_top_n", ranking.min_top_n, 1)?;
        validate_positive_number("ranking.max_top_n", ranking.max_top_n, ranking.min_top_n)?;
        crate::utils::validation::validate_range(
            "ranking.default_top_n",
            ranking.default_top_n,
            ranking.min_top_n,
            ranking.max_top_n,
        )?;
        validate_positive_number("ranking.similar_top_n", ranking.similar_top_n, 1)?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn assets_path(&self) -> &str {
        &self.assets.path
    }

    fn catalog_file(&self) -> &str {
        &self.assets.catalog_file
    }

    fn factor_model_file(&self) -> &str {
        &self.assets.factor_model_file
    }

    fn neighbor_model_file(&self) -> &str {
        &self.assets.neighbor_model_file
    }

    fn weight_a(&self) -> f64 {
        self.scoring.weight_a
    }

    fn weight_b(&self) -> f64 {
        self.scoring.weight_b
    }

    fn call_budget(&self) -> Option<Duration> {
        self.scoring.call_budget_ms.map(Duration::from_millis)
    }

    fn default_top_n(&self) -> usize {
        self.ranking.default_top_n
    }

    fn top_n_bounds(&self) -> (usize, usize) {
        (self.ranking.min_top_n, self.ranking.max_top_n)
    }

    fn similar_top_n(&self) -> usize {
        self.ranking.similar_top_n
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_tables_missing() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.assets.path, "models");
        assert_eq!(config.weights(), ScoringWeights::default());
        assert_eq!(config.top_n_bounds(), (5, 20));
        assert_eq!(config.default_top_n(), 10);
        assert_eq!(config.similar_top_n(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[assets]
path = "bundles/books.zip"
catalog_file = "df_small.csv"

[scoring]
weight_a = 0.7
weight_b = 0.3
call_budget_ms = 50

[ranking]
default_top_n = 8

[output]
format = "json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.is_archive());
        assert_eq!(config.assets.catalog_file, "df_small.csv");
        assert_eq!(config.assets.factor_model_file, "svd_model.json");
        assert_eq!(config.weight_a(), 0.7);
        assert_eq!(config.call_budget(), Some(Duration::from_millis(50)));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BOOKREC_TEST_ASSETS", "/srv/bookrec/models");

        let toml_content = r#"
[assets]
path = "${BOOKREC_TEST_ASSETS}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.assets.path, "/srv/bookrec/models");
        assert!(!config.is_archive());

        std::env::remove_var("BOOKREC_TEST_ASSETS");
    }

    #[test]
    fn test_unset_env_var_kept_verbatim() {
        let config = AppConfig::from_toml_str("[assets]\npath = \"${BOOKREC_SURELY_UNSET_VAR}\"\n").unwrap();
        assert_eq!(config.assets.path, "${BOOKREC_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_config_validation() {
        let bad_weight = AppConfig::from_toml_str("[scoring]\nweight_a = -1.0\n").unwrap();
        assert!(bad_weight.validate().is_err());

        let bad_bounds = AppConfig::from_toml_str("[ranking]\nmin_top_n = 10\nmax_top_n = 5\n").unwrap();
        assert!(bad_bounds.validate().is_err());

        let bad_extension = AppConfig::from_toml_str("[assets]\nfactor_model_file = \"svd.pkl\"\n").unwrap();
        assert!(bad_extension.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("[scoring\nweight_a = "),
            Err(RecError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[assets]\npath = \"./fixtures\"\n[ranking]\nsimilar_top_n = 3\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.assets_path(), "./fixtures");
        assert_eq!(config.similar_top_n(), 3);
    }
}
