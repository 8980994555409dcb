#![allow(dead_code)]

use std::sync::Arc;

use serde::Deserialize;

use formscore_api::KeypointFrame;
use formscore_pipeline::{
    AiJudge, FormPipeline, ReferenceLibrary, RuleTable, StaticGenerator, TextGenerator,
    UnavailableGenerator,
};
use formscore_test_fixtures::{reference_poses, rule_tables, scenarios};

#[derive(Debug, Deserialize, Clone)]
pub struct Expectation {
    pub final_score: f64,
    pub ai_score: f64,
    pub bio_score: f64,
    pub pt_score: f64,
    pub violations: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    pub description: Option<String>,
    pub exercise: String,
    pub rules: String,
    pub references: String,
    /// `None` simulates an unavailable AI service.
    pub ai_reply: Option<String>,
    pub frame: KeypointFrame,
    pub expect: Expectation,
}

impl Scenario {
    pub fn load(name: &str) -> Self {
        scenarios::load(name).unwrap_or_else(|e| panic!("load scenario {name}: {e:#}"))
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        match &self.ai_reply {
            Some(reply) => Arc::new(StaticGenerator::new(reply.clone())),
            None => Arc::new(UnavailableGenerator),
        }
    }

    pub fn pipeline(&self) -> FormPipeline {
        FormPipeline::new(
            Arc::new(rule_table(&self.rules)),
            Arc::new(reference_library(&self.references)),
            AiJudge::new(self.generator()),
        )
    }
}

pub fn rule_table(name: &str) -> RuleTable {
    let text = rule_tables::json(name).unwrap_or_else(|e| panic!("rule table {name}: {e:#}"));
    RuleTable::from_json_str(&text).unwrap_or_else(|e| panic!("parse rule table {name}: {e}"))
}

pub fn reference_library(name: &str) -> ReferenceLibrary {
    let text = reference_poses::json(name).unwrap_or_else(|e| panic!("reference {name}: {e:#}"));
    ReferenceLibrary::from_json_str(&text).unwrap_or_else(|e| panic!("parse reference {name}: {e}"))
}
