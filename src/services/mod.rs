pub mod table_orchestrator;

pub use table_orchestrator::{
    TableOptions, TableOrchestrator, TableOrchestratorBuilder, TableRender, TableState, TableView,
};
