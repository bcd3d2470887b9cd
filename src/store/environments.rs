use crate::environment::model::Environment;
use crate::error::{EngineError, Result};
use crate::store::repo::Shared;

pub struct EnvironmentOperations {
    pub(crate) entities: Shared<Environment>,
}

impl EnvironmentOperations {
    pub async fn create(&self, environment: Environment) -> Environment {
        self.entities
            .write()
            .unwrap()
            .insert(environment.id.clone(), environment.clone());
        environment
    }

    pub async fn get(&self, id: &String) -> Result<Environment> {
        self.entities
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("environment", id))
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Environment> {
        self.entities
            .read()
            .unwrap()
            .values()
            .find(|environment| environment.name == name)
            .cloned()
    }

    pub async fn list(&self) -> Vec<Environment> {
        let mut environments: Vec<Environment> =
            self.entities.read().unwrap().values().cloned().collect();
        environments.sort_by(|a, b| a.name.cmp(&b.name));
        environments
    }
}
