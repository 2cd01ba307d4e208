//! Grimoire 交互入口
//!
//! 读取 RPG 系统（领域）与创作请求，装配 Controller 并执行；计划、逐步进度与最终回答输出到 stdout。

use std::io::{self, BufRead, Write};

use anyhow::Context;
use grimoire::config::{load_config_or_default, Credentials};
use grimoire::core::create_controller;
use grimoire::pipeline::{log_token_usage, PipelineEvent};
use tokio::sync::mpsc;

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<PipelineEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::Planning => println!("\n--- Gerando plano... ---"),
            PipelineEvent::PlanReady { plan } => println!("\nPlano gerado: {}", plan),
            PipelineEvent::StepStarted { tool, query, .. } => {
                println!("\nExecutando passo: usar '{}' com a query '{}'", tool, query)
            }
            PipelineEvent::StepSkipped { step, .. } => {
                println!("Passo inválido no plano, pulando: {:?}", step)
            }
            PipelineEvent::StepFinished { .. } => {}
            PipelineEvent::Synthesizing => println!("\n--- Sintetizando resposta final... ---"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grimoire::observability::init();

    println!("--- Bem-vindo ao Grimoire! ---");
    println!("Descreva o que você quer criar e para qual sistema de RPG.\n");

    let domain = prompt("Primeiro, informe o sistema de RPG (ex: Tormenta20, Cthulhu): ")?;
    let request = prompt(&format!(
        "Agora, descreva seu personagem/aventura/cenário para {}: ",
        domain
    ))?;
    if domain.is_empty() || request.is_empty() {
        println!("Ambos os campos, sistema e pedido, são obrigatórios.");
        return Ok(());
    }

    let cfg = load_config_or_default(None);
    let (controller, backend) = create_controller(&cfg, &Credentials::from_env(), &domain)
        .context("Failed to create controller")?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(event_rx));
    let controller = controller.with_event_tx(event_tx);

    let outcome = controller.execute(&request).await;
    drop(controller);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "progress printer task failed");
    }
    log_token_usage(backend.as_ref());

    match outcome {
        Ok(answer) => {
            println!("\n\n================= RESPOSTA FINAL =================\n");
            println!("{}", answer);
            println!("\n==================================================\n");
        }
        Err(e) => {
            tracing::error!(error = %e, "request failed");
            println!("\nOcorreu um erro inesperado: {}", e);
        }
    }

    Ok(())
}
