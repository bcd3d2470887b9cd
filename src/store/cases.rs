use crate::case::model::TestCase;
use crate::error::{EngineError, Result};
use crate::store::repo::Shared;

pub struct CaseOperations {
    pub(crate) entities: Shared<TestCase>,
}

impl CaseOperations {
    pub async fn create(&self, case: TestCase) -> TestCase {
        self.entities
            .write()
            .unwrap()
            .insert(case.id.clone(), case.clone());
        case
    }

    pub async fn get(&self, id: &String) -> Result<TestCase> {
        self.entities
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("case", id))
    }

    /// Resolves ids in the given order; any missing id fails the lookup.
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<TestCase>> {
        let entities = self.entities.read().unwrap();
        ids.iter()
            .map(|id| {
                entities
                    .get(id)
                    .cloned()
                    .ok_or_else(|| EngineError::not_found("case", id))
            })
            .collect()
    }
}
