//! Vegetation model catalog: maps vegetation names to model files and the
//! material slots each model uses.
//!
//! Lookup only. Loading the referenced glTF files belongs to the renderer.

/// One entry of a model collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: &'static str,
    /// Number of numbered variants (`Name_1.gltf` ..). `None` means a single
    /// unnumbered file.
    pub versions: Option<u32>,
    pub materials: &'static [&'static str],
}

/// A named set of models sharing a base directory.
#[derive(Clone, Copy, Debug)]
pub struct Collection {
    pub name: &'static str,
    pub base_path: &'static str,
    pub models: &'static [ModelEntry],
}

/// Model file paths and material names for one vegetation type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelFiles {
    pub file_paths: Vec<String>,
    pub materials: Vec<String>,
}

const fn model(
    name: &'static str,
    versions: Option<u32>,
    materials: &'static [&'static str],
) -> ModelEntry {
    ModelEntry {
        name,
        versions,
        materials,
    }
}

const LOW_POLY_NATURE_MODELS: &[ModelEntry] = &[
    model("BirchTree", Some(5), &["White", "Black", "DarkGreen", "Green"]),
    model("BirchTree_Dead", Some(5), &["White", "Black"]),
    model("BirchTree_Dead_Snow", Some(5), &["White", "Snow", "Black"]),
    model("BirchTree_Snow", Some(5), &["White", "Black", "DarkGreen", "Green", "Snow"]),
    model("Bush", Some(2), &["Green"]),
    model("Bush_Snow", Some(2), &["Snow", "Green"]),
    model("BushBerries", Some(2), &["Green", "Red"]),
    model("Cactus", Some(5), &["Green", "LightOrange"]),
    model("CactusFlowers", Some(5), &["Green", "Pink"]),
    model("CommonTree", Some(5), &["Brown", "Green", "DarkGreen"]),
    model("CommonTree_Dead", Some(5), &["Brown"]),
    model("CommonTree_Dead_Snow", Some(5), &["Brown", "Snow"]),
    model("CommonTree_Snow", Some(5), &["Brown", "Green", "Snow", "DarkGreen"]),
    model("Corn", Some(2), &["Green", "Yellow"]),
    model("Flowers", None, &["Green", "Cyan", "Yellow"]),
    model("Grass", Some(3), &["Green"]),
    model("Lilypad", None, &["Green", "Pink"]),
    model("PalmTree", Some(4), &["Brown", "Green", "DarkGreen"]),
    model("PineTree", Some(5), &["Brown", "Green"]),
    model("PineTree_Snow", Some(5), &["Brown", "Green", "Snow"]),
    model("Plant", Some(5), &["Brown", "Green", "DarkGreen", "Yellow", "Pink"]),
    model("Rock", Some(7), &["Gray"]),
    model("Rock_Moss", Some(7), &["Gray", "Green"]),
    model("Rock_Snow", Some(7), &["Gray", "Snow"]),
    model("TreeStump_Moss", None, &["Brown", "Green"]),
    model("TreeStump_Snow", None, &["Brown", "Snow"]),
    model("TreeStump", None, &["Brown", "LightBrown", "Green"]),
    model("Wheat", None, &["Yellow"]),
    model("Willow", Some(5), &["Brown", "DarkGreen"]),
    model("Willow_Dead", Some(5), &["Brown"]),
    model("Willow_Dead_Snow", Some(5), &["Brown", "Snow"]),
    model("Willow_Snow", Some(5), &["Brown", "Snow", "DarkGreen"]),
    model(
        "WoodLog_Moss",
        None,
        &["Brown", "Green", "Mushroom_Top", "Mushroom_Bottom", "DarkGreen"],
    ),
    model("WoodLog_Snow", None, &["Brown", "Snow"]),
    model("WoodLog", None, &["Brown", "Mushroom_Top", "Mushroom_Bottom"]),
];

/// The low-poly nature collection.
pub const LOW_POLY_NATURE: Collection = Collection {
    name: "lowpoly_nature",
    base_path: "/lowpoly_nature/",
    models: LOW_POLY_NATURE_MODELS,
};

impl Collection {
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == name)
    }

    /// All model names, in catalog order.
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.name).collect()
    }

    /// File paths and materials for `name`, or `None` if it is not in the catalog.
    pub fn model_files(&self, name: &str) -> Option<ModelFiles> {
        let Some(entry) = self.get(name) else {
            tracing::warn!(model = name, collection = self.name, "Model not found");
            return None;
        };

        let file_paths = match entry.versions {
            Some(versions) => (1..=versions)
                .map(|i| format!("{}{}_{}.gltf", self.base_path, entry.name, i))
                .collect(),
            None => vec![format!("{}{}.gltf", self.base_path, entry.name)],
        };

        Some(ModelFiles {
            file_paths,
            materials: entry.materials.iter().map(|m| m.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_model_paths() {
        let files = LOW_POLY_NATURE.model_files("PineTree").unwrap();
        assert_eq!(files.file_paths.len(), 5);
        assert_eq!(files.file_paths[0], "/lowpoly_nature/PineTree_1.gltf");
        assert_eq!(files.file_paths[4], "/lowpoly_nature/PineTree_5.gltf");
        assert_eq!(files.materials, vec!["Brown", "Green"]);
    }

    #[test]
    fn test_single_file_model() {
        let files = LOW_POLY_NATURE.model_files("Wheat").unwrap();
        assert_eq!(files.file_paths, vec!["/lowpoly_nature/Wheat.gltf"]);
    }

    #[test]
    fn test_unknown_model() {
        assert!(LOW_POLY_NATURE.model_files("Baobab").is_none());
    }

    #[test]
    fn test_preset_vegetation_is_in_catalog() {
        for biome in [
            crate::BiomeConfig::temperate(),
            crate::BiomeConfig::desert(),
        ] {
            for item in &biome.vegetation {
                assert!(
                    LOW_POLY_NATURE.get(&item.name).is_some(),
                    "{} missing from catalog",
                    item.name
                );
            }
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names = LOW_POLY_NATURE.model_names();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
