//! JSON messages exchanged with WebSocket clients

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adaptability::{AdaptationStrategy, BusinessContext, ContextRequest};
use crate::engine::{Engine, RecommendRequest, Recommendation};
use crate::error::{PitchwiseError, Result};
use crate::logger;
use crate::marketing::{MarketingPackage, MarketingRequest, RoiAnalysis, RoiInput};
use crate::types::BusinessSize;

pub const PROTOCOL_VERSION: u32 = 1;

const DEFAULT_LOG_LINES: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageEnvelope<T> {
    pub v: u32,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub request_id: Option<Uuid>,
    #[serde(default)]
    pub event_id: Option<u64>,
    pub payload: T,
}

impl MessageEnvelope<ServerEvent> {
    pub fn event(request_id: Option<Uuid>, event_id: u64, event: ServerEvent) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            msg_type: event.kind().to_string(),
            request_id,
            event_id: Some(event_id),
            payload: event,
        }
    }
}

impl MessageEnvelope<ClientMessage> {
    pub fn parse(text: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(text)
            .map_err(|e| PitchwiseError::invalid_input(format!("malformed message: {}", e)))?;
        if envelope.v != PROTOCOL_VERSION {
            return Err(PitchwiseError::invalid_input(format!(
                "unsupported protocol version {} (expected {})",
                envelope.v, PROTOCOL_VERSION
            )));
        }
        if envelope.msg_type != envelope.payload.kind() {
            return Err(PitchwiseError::invalid_input(format!(
                "envelope type '{}' does not match payload type '{}'",
                envelope.msg_type,
                envelope.payload.kind()
            )));
        }
        Ok(envelope)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        client: ClientInfo,
        /// Reseed generated text for reproducible output
        #[serde(default)]
        seed: Option<u64>,
    },
    AnalyzeContext {
        request: ContextRequest,
    },
    AdaptationStrategy {
        request: ContextRequest,
    },
    Recommend {
        request: RecommendRequest,
    },
    MarketingPackage {
        request: MarketingRequest,
    },
    ElevatorPitch {
        industry: String,
        #[serde(default)]
        business_size: BusinessSize,
        role: String,
    },
    Proposal {
        request: MarketingRequest,
        company: String,
    },
    Roi {
        input: RoiInput,
    },
    RecentLogs {
        #[serde(default = "default_log_lines")]
        lines: usize,
    },
}

fn default_log_lines() -> usize {
    DEFAULT_LOG_LINES
}

impl ClientMessage {
    pub const KINDS: [&'static str; 9] = [
        "hello",
        "analyze_context",
        "adaptation_strategy",
        "recommend",
        "marketing_package",
        "elevator_pitch",
        "proposal",
        "roi",
        "recent_logs",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Hello { .. } => "hello",
            ClientMessage::AnalyzeContext { .. } => "analyze_context",
            ClientMessage::AdaptationStrategy { .. } => "adaptation_strategy",
            ClientMessage::Recommend { .. } => "recommend",
            ClientMessage::MarketingPackage { .. } => "marketing_package",
            ClientMessage::ElevatorPitch { .. } => "elevator_pitch",
            ClientMessage::Proposal { .. } => "proposal",
            ClientMessage::Roi { .. } => "roi",
            ClientMessage::RecentLogs { .. } => "recent_logs",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    HelloAck {
        server: ServerInfo,
        capabilities: Vec<String>,
    },
    ContextAnalysis {
        context: Box<BusinessContext>,
    },
    Strategy {
        context: Box<BusinessContext>,
        strategy: Box<AdaptationStrategy>,
    },
    Recommendation {
        recommendation: Box<Recommendation>,
    },
    Package {
        package: Box<MarketingPackage>,
    },
    Pitch {
        pitch: String,
    },
    Proposal {
        proposal: String,
    },
    Roi {
        analysis: Box<RoiAnalysis>,
        summary: String,
    },
    /// Newest first
    Logs {
        lines: Vec<String>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::HelloAck { .. } => "hello_ack",
            ServerEvent::ContextAnalysis { .. } => "context_analysis",
            ServerEvent::Strategy { .. } => "strategy",
            ServerEvent::Recommendation { .. } => "recommendation",
            ServerEvent::Package { .. } => "package",
            ServerEvent::Pitch { .. } => "pitch",
            ServerEvent::Proposal { .. } => "proposal",
            ServerEvent::Roi { .. } => "roi",
            ServerEvent::Logs { .. } => "logs",
            ServerEvent::Error { .. } => "error",
        }
    }

    pub fn error(err: &PitchwiseError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    /// Informational model name from the configuration
    pub model: String,
}

/// Answer one client message; failures become `error` events
pub fn dispatch(engine: &mut Engine, message: ClientMessage) -> ServerEvent {
    match handle(engine, message) {
        Ok(event) => event,
        Err(err) => {
            log::warn!("request failed: {}", err);
            ServerEvent::error(&err)
        }
    }
}

fn handle(engine: &mut Engine, message: ClientMessage) -> Result<ServerEvent> {
    Ok(match message {
        ClientMessage::Hello { client, seed } => {
            log::info!("client connected: {} {}", client.name, client.version);
            if let Some(seed) = seed {
                engine.marketing().reseed(seed);
            }
            ServerEvent::HelloAck {
                server: ServerInfo {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    model: engine.config().model.name.clone(),
                },
                capabilities: ClientMessage::KINDS.iter().map(|k| k.to_string()).collect(),
            }
        }
        ClientMessage::AnalyzeContext { request } => ServerEvent::ContextAnalysis {
            context: Box::new(engine.analyze(&request)?),
        },
        ClientMessage::AdaptationStrategy { request } => {
            let context = engine.analyze(&request)?;
            let strategy = engine.strategy(&context);
            ServerEvent::Strategy {
                context: Box::new(context),
                strategy: Box::new(strategy),
            }
        }
        ClientMessage::Recommend { request } => ServerEvent::Recommendation {
            recommendation: Box::new(engine.recommend(&request)?),
        },
        ClientMessage::MarketingPackage { request } => ServerEvent::Package {
            package: Box::new(engine.marketing().marketing_package(&request)?),
        },
        ClientMessage::ElevatorPitch {
            industry,
            business_size,
            role,
        } => ServerEvent::Pitch {
            pitch: engine.marketing().elevator_pitch(&industry, business_size, &role)?,
        },
        ClientMessage::Proposal { request, company } => ServerEvent::Proposal {
            proposal: engine.marketing().detailed_proposal(&request, &company)?,
        },
        ClientMessage::Roi { input } => {
            let calculator = engine.marketing().roi();
            let analysis = calculator.calculate(&input)?;
            let summary = calculator.summary(&analysis);
            ServerEvent::Roi {
                analysis: Box::new(analysis),
                summary,
            }
        }
        ClientMessage::RecentLogs { lines } => ServerEvent::Logs {
            lines: logger::recent(lines),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::knowledge::KnowledgeBase;
    use log::LevelFilter;
    use serde_json::json;

    fn engine() -> Engine {
        let mut config = Config::default();
        config.marketing.seed = Some(17);
        Engine::new(KnowledgeBase::embedded().unwrap(), config).unwrap()
    }

    #[test]
    fn test_parse_envelope() {
        let text = json!({
            "v": 1,
            "type": "analyze_context",
            "request_id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "payload": {
                "type": "analyze_context",
                "request": {"business_description": "A hospital with doctors and nurses", "job_title": "CFO"}
            }
        })
        .to_string();
        let envelope = MessageEnvelope::<ClientMessage>::parse(&text).unwrap();
        assert!(envelope.request_id.is_some());
        assert!(matches!(envelope.payload, ClientMessage::AnalyzeContext { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(MessageEnvelope::<ClientMessage>::parse("not json").is_err());
        let wrong_version = json!({"v": 2, "type": "hello", "payload": {"type": "hello", "client": {"name": "x", "version": "1"}}});
        assert!(MessageEnvelope::<ClientMessage>::parse(&wrong_version.to_string()).is_err());
    }

    #[test]
    fn test_parse_rejects_mismatched_type() {
        let text = json!({
            "v": 1,
            "type": "roi",
            "payload": {"type": "hello", "client": {"name": "x", "version": "1"}}
        })
        .to_string();
        let err = MessageEnvelope::<ClientMessage>::parse(&text).unwrap_err();
        assert!(matches!(err, PitchwiseError::InvalidInput { .. }));
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_kinds_match_variants() {
        let hello = ClientMessage::Hello {
            client: ClientInfo {
                name: "x".to_string(),
                version: "1".to_string(),
            },
            seed: None,
        };
        let logs = ClientMessage::RecentLogs { lines: 5 };
        for message in [hello, logs] {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["type"], message.kind());
            assert!(ClientMessage::KINDS.contains(&message.kind()));
        }
    }

    #[test]
    fn test_hello_reports_model() {
        let mut engine = engine();
        let event = dispatch(
            &mut engine,
            ClientMessage::Hello {
                client: ClientInfo {
                    name: "test".to_string(),
                    version: "0.1".to_string(),
                },
                seed: None,
            },
        );
        match event {
            ServerEvent::HelloAck { server, capabilities } => {
                assert_eq!(server.model, "pitchwise-rules");
                assert!(capabilities.contains(&"recommend".to_string()));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_hello_seed_makes_output_reproducible() {
        let hello = |seed| ClientMessage::Hello {
            client: ClientInfo {
                name: "test".to_string(),
                version: "0.1".to_string(),
            },
            seed: Some(seed),
        };
        let pitch = || ClientMessage::ElevatorPitch {
            industry: "retail".to_string(),
            business_size: BusinessSize::Small,
            role: "executive".to_string(),
        };

        let mut first = engine();
        let mut second =
            Engine::new(KnowledgeBase::embedded().unwrap(), Config::default()).unwrap();
        dispatch(&mut first, hello(5));
        dispatch(&mut second, hello(5));
        match (dispatch(&mut first, pitch()), dispatch(&mut second, pitch())) {
            (ServerEvent::Pitch { pitch: a }, ServerEvent::Pitch { pitch: b }) => assert_eq!(a, b),
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_recent_logs_dispatch() {
        logger::init(LevelFilter::Info, None, false).unwrap();
        log::info!("protocol log marker");

        let mut engine = engine();
        match dispatch(&mut engine, ClientMessage::RecentLogs { lines: 1000 }) {
            ServerEvent::Logs { lines } => {
                assert!(lines.iter().any(|line| line.ends_with("protocol log marker")));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_analyze_dispatch() {
        let mut engine = engine();
        let request = ContextRequest::new(
            "We are a hospital providing medical care and treatment to patients, with doctors and nurses on staff.",
            "CFO",
        );
        match dispatch(&mut engine, ClientMessage::AnalyzeContext { request }) {
            ServerEvent::ContextAnalysis { context } => assert_eq!(context.industry.id, "healthcare"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_errors_become_events() {
        let mut engine = engine();
        let input = RoiInput::new("retail", BusinessSize::Small, -10.0, 2);
        let event = dispatch(&mut engine, ClientMessage::Roi { input });
        match &event {
            ServerEvent::Error { code, message } => {
                assert_eq!(code, "invalid_input");
                assert!(message.contains("annual revenue"));
            }
            other => panic!("unexpected event {:?}", other),
        }

        let envelope = MessageEnvelope::event(None, 4, event);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["event_id"], 4);
        assert_eq!(value["payload"]["type"], "error");
    }

    #[test]
    fn test_roi_dispatch() {
        let mut engine = engine();
        let input = RoiInput::new("retail", BusinessSize::Medium, 5_000_000.0, 50);
        match dispatch(&mut engine, ClientMessage::Roi { input }) {
            ServerEvent::Roi { analysis, summary } => {
                assert_eq!(analysis.total_first_year_cost, 15_000.0);
                assert!(summary.starts_with("ROI Summary"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
