//! Interface de terminal do parsesmith — spinner e linhas de status coloridas.
//!
//! O controlador reporta o andamento por meio do trait [`ProgressSink`];
//! [`RunProgress`] implementa esse trait com `indicatif` e `console`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::state_machine::{Phase, RunReport, Termination};
use crate::target::Target;

/// Receptor das linhas de status emitidas a cada transição.
pub trait ProgressSink {
    /// O controlador entrou em `phase` durante a tentativa `attempt` (1-based).
    fn phase(&self, phase: Phase, attempt: u32);

    /// A tentativa falhou e haverá outra.
    fn retry(&self, attempt: u32, max: u32, reason: &str);

    /// A execução terminou.
    fn finished(&self, termination: Termination, attempts: u32);
}

/// Indicador visual de progresso para uma execução no terminal.
///
/// Exibe um spinner durante cada fase e mensagens coloridas para sucesso
/// (verde), esgotamento (vermelho) e retentativa (amarelo).
pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Cria o spinner ainda parado. O [`bar`](Self::bar) pode ser
    /// entregue ao [`crate::logging`] antes da execução começar.
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
        }

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Handle compartilhado do spinner.
    pub fn bar(&self) -> ProgressBar {
        self.pb.clone()
    }

    /// Começa a girar o spinner para o alvo informado.
    pub fn start(&self, target: &Target) {
        self.pb.set_message(format!("{}: {target}", Phase::Generate));
        self.pb.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    /// Encerra o spinner sem mensagem final (usado em erros fatais).
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }

    /// Imprime o relatório da execução em JSON com estilo colorido.
    pub fn print_report(&self, report: &RunReport) {
        let style = match report.termination {
            Termination::Verified => &self.green,
            Termination::Exhausted => &self.red,
        };
        println!();
        println!("{}", style.apply_to("─── Run Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}

impl ProgressSink for RunProgress {
    fn phase(&self, phase: Phase, attempt: u32) {
        self.pb.set_message(format!("[attempt {attempt}] {phase}"));
    }

    fn retry(&self, attempt: u32, max: u32, reason: &str) {
        let first_line = reason.lines().next().unwrap_or(reason);
        self.pb.println(format!(
            "  {} Attempt {attempt}/{max} failed: {first_line}. Retrying...",
            self.yellow.apply_to("↻")
        ));
    }

    fn finished(&self, termination: Termination, attempts: u32) {
        self.pb.finish_and_clear();
        match termination {
            Termination::Verified => println!(
                "  {} Parser passed all tests (attempt {attempts})",
                self.green.apply_to("✓")
            ),
            Termination::Exhausted => println!(
                "  {} Failed after {attempts} attempts",
                self.red.apply_to("✗")
            ),
        }
    }
}
