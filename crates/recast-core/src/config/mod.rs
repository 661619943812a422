mod settings;

pub use settings::RecastConfig;
