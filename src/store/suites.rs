use crate::error::{EngineError, Result};
use crate::store::repo::Shared;
use crate::suite::model::Suite;

pub struct SuiteOperations {
    pub(crate) entities: Shared<Suite>,
}

impl SuiteOperations {
    pub async fn create(&self, suite: Suite) -> Suite {
        self.entities
            .write()
            .unwrap()
            .insert(suite.id.clone(), suite.clone());
        suite
    }

    pub async fn get(&self, id: &String) -> Result<Suite> {
        self.entities
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("suite", id))
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Suite> {
        self.entities
            .read()
            .unwrap()
            .values()
            .find(|suite| suite.name == name)
            .cloned()
    }

    pub async fn list(&self) -> Vec<Suite> {
        let mut suites: Vec<Suite> = self.entities.read().unwrap().values().cloned().collect();
        suites.sort_by(|a, b| a.name.cmp(&b.name));
        suites
    }
}
