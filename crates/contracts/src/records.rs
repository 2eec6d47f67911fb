//! Schemas for the records agents are asked to produce.

use triagent_core::{
    Citation, Complexity, ConfidenceLevel, Finding, Recommendation, Severity, SeverityAnalysis,
    SourceType, ValidityAnalysis,
};

use crate::schema::{FieldType, Schema, StructuredOutput};

fn citation_schema() -> Schema {
    Schema::new("Citation")
        .field("source_type", FieldType::one_of(&SourceType::ALL))
        .field("source_id", FieldType::text(1))
        .field("source_url", FieldType::text(1))
        .field("excerpt", FieldType::text(1))
        .optional("retrieved_at", FieldType::string())
}

fn citations() -> FieldType {
    FieldType::non_empty_list(FieldType::object(citation_schema()), 1)
}

impl StructuredOutput for Citation {
    fn schema() -> Schema {
        citation_schema()
    }
}

impl StructuredOutput for ValidityAnalysis {
    fn schema() -> Schema {
        Schema::new("ValidityAnalysis")
            .field("is_valid", FieldType::Bool)
            .field("is_actionable", FieldType::Bool)
            .optional("missing_context", FieldType::list(FieldType::string()))
            .field("reasoning", FieldType::text(1))
    }
}

impl StructuredOutput for SeverityAnalysis {
    fn schema() -> Schema {
        Schema::new("SeverityAnalysis")
            .field("severity", FieldType::one_of(&Severity::ALL))
            .field("complexity", FieldType::one_of(&Complexity::ALL))
            .optional("required_expertise", FieldType::list(FieldType::string()))
            .field("reasoning", FieldType::text(1))
    }
}

impl StructuredOutput for Finding {
    fn schema() -> Schema {
        Schema::new("Finding")
            .field("finding", FieldType::text(10))
            .field("confidence", FieldType::one_of(&ConfidenceLevel::ALL))
            .field("citations", citations())
    }
}

impl StructuredOutput for Recommendation {
    fn schema() -> Schema {
        Schema::new("Recommendation")
            .field("recommendation", FieldType::text(10))
            .field("reasoning", FieldType::text(10))
            .field("confidence", FieldType::one_of(&ConfidenceLevel::ALL))
            .field("citations", citations())
    }
}

#[cfg(test)]
mod tests {
    use crate::{extract, validate};
    use serde_json::json;
    use triagent_core::{
        Citation, Complexity, ConfidenceLevel, Finding, Recommendation, Severity,
        SeverityAnalysis, SourceType, ValidityAnalysis,
    };

    #[test]
    fn validity_from_fenced_agent_output() {
        let raw = "Here is my analysis:\n```json\n{\"is_valid\": true, \"is_actionable\": false, \
                   \"missing_context\": [\"browser version\"], \"reasoning\": \"Reproducible but vague\"}\n```";
        let analysis: ValidityAnalysis = validate(&extract(raw).unwrap()).unwrap();
        assert!(analysis.is_valid);
        assert!(!analysis.is_actionable);
        assert_eq!(analysis.missing_context, vec!["browser version"]);
    }

    #[test]
    fn severity_rejects_unknown_bucket() {
        let err = validate::<SeverityAnalysis>(&json!({
            "severity": "P5",
            "complexity": "medium",
            "reasoning": "checkout down"
        }))
        .unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "severity");
    }

    #[test]
    fn severity_parses_enums() {
        let s: SeverityAnalysis = validate(&json!({
            "severity": "P0",
            "complexity": "complex",
            "required_expertise": ["payments"],
            "reasoning": "checkout down for all users"
        }))
        .unwrap();
        assert_eq!(s.severity, Severity::P0);
        assert_eq!(s.complexity, Complexity::Complex);
    }

    #[test]
    fn finding_requires_a_citation() {
        let err = validate::<Finding>(&json!({
            "finding": "Session tokens expire early",
            "confidence": "high",
            "citations": []
        }))
        .unwrap_err();
        assert_eq!(err.violations[0].path, "citations");
    }

    #[test]
    fn finding_citation_fields_are_checked() {
        let err = validate::<Finding>(&json!({
            "finding": "Session tokens expire early",
            "confidence": "high",
            "citations": [{
                "source_type": "wiki",
                "source_id": "ENG-1",
                "source_url": "",
                "excerpt": "token ttl"
            }]
        }))
        .unwrap_err();
        let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["citations[0].source_type", "citations[0].source_url"]
        );
    }

    #[test]
    fn recommendation_with_citation_deserializes() {
        let rec: Recommendation = validate(&json!({
            "recommendation": "Extend the token refresh window",
            "reasoning": "Matches the fix applied in ENG-12",
            "confidence": "medium",
            "citations": [{
                "source_type": "issue",
                "source_id": "ENG-12",
                "source_url": "https://linear.app/issue/ENG-12",
                "excerpt": "Refresh window raised to 10 minutes"
            }]
        }))
        .unwrap();
        assert_eq!(rec.confidence, ConfidenceLevel::Medium);
        assert_eq!(rec.citations[0].source_type(), SourceType::Issue);
        assert_eq!(rec.citations[0].source_id(), "ENG-12");
    }

    #[test]
    fn short_recommendation_is_rejected() {
        let err = validate::<Recommendation>(&json!({
            "recommendation": "Fix it",
            "reasoning": "Because it is broken",
            "confidence": "low",
            "citations": [{
                "source_type": "logs",
                "source_id": "req-9",
                "source_url": "logs://req-9",
                "excerpt": "500"
            }]
        }))
        .unwrap_err();
        assert_eq!(err.violations[0].path, "recommendation");
        assert!(err.violations[0].message.contains("at least 10 characters"));
    }

    #[test]
    fn serialized_records_survive_extract_and_validate() {
        let rec = Recommendation {
            recommendation: "Raise the connection pool limit".into(),
            reasoning: "Pool exhaustion preceded every timeout in ENG-42".into(),
            confidence: ConfidenceLevel::High,
            citations: vec![
                Citation::new(
                    SourceType::Logs,
                    "req-981",
                    "logs://req-981",
                    "pool exhausted: 50/50 connections in use",
                )
                .unwrap(),
            ],
        };
        let raw = format!(
            "Here is my recommendation: {} Let me know if you need more.",
            serde_json::to_string(&rec).unwrap()
        );
        let back: Recommendation = validate(&extract(&raw).unwrap()).unwrap();
        assert_eq!(back, rec);

        let severity = SeverityAnalysis {
            severity: Severity::P2,
            complexity: Complexity::Simple,
            required_expertise: vec!["database".into(), "ops".into()],
            reasoning: "Degraded but a workaround exists".into(),
        };
        let raw = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&severity).unwrap()
        );
        let back: SeverityAnalysis = validate(&extract(&raw).unwrap()).unwrap();
        assert_eq!(back, severity);
    }
}
