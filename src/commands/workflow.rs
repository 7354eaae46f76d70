//! # workflow 命令实现
//!
//! 在本地按顺序运行工作流的各阶段，结束后打印输出。
//!
//! ## 依赖关系
//! - 使用 `cli/workflow.rs` 定义的参数
//! - 使用 `workflows/`, `engine/local.rs`

use super::print_rows;
use crate::cli::workflow::{ChainArgs, DftPreciseArgs, WorkflowArgs, WorkflowCommands};
use crate::engine::LocalRunner;
use crate::error::Result;
use crate::utils::output;
use crate::workflows::{DftChain, DftPreciseChain, QmcChain};

/// 执行 workflow 命令
pub fn execute(args: WorkflowArgs) -> Result<()> {
    match args.command {
        WorkflowCommands::Dft(chain) => run_dft(chain),
        WorkflowCommands::DftPrecise(precise) => run_dft_precise(precise),
        WorkflowCommands::Qmc(chain) => run_qmc(chain),
    }
}

fn run_dft(args: ChainArgs) -> Result<()> {
    let chain = DftChain::load(&args.input)?;
    output::print_header(&format!("DFT workflow: {}", chain.structure.formula()));

    let mut runner = LocalRunner::new(&args.work_root);
    let out = chain.run(&mut runner)?;

    let mut rows = vec![("energy (Ha)".to_string(), format!("{:.8}", out.energy))];
    if let Some(pseudo) = &out.pseudo {
        rows.push(("pseudo".to_string(), pseudo.display().to_string()));
    }
    rows.push(("fort10".to_string(), out.prep.fort10.display().to_string()));
    print_rows(rows);
    Ok(())
}

fn run_dft_precise(args: DftPreciseArgs) -> Result<()> {
    let chain = DftPreciseChain::load(&args.chain.input)?;
    output::print_header(&format!(
        "DFT grid convergence: {}",
        chain.dft.structure.formula()
    ));

    let mut runner = LocalRunner::new(&args.chain.work_root);
    let convergence = chain.run(&mut runner)?;

    print_rows(
        convergence
            .points
            .iter()
            .map(|(index, p)| {
                (
                    format!("{} (grid {:.4})", index, p.density),
                    format!("{:.8}", p.energy),
                )
            })
            .collect(),
    );

    if let Some(csv) = &args.csv {
        convergence.to_csv(csv)?;
        output::print_success(&format!("Convergence data written to '{}'", csv.display()));
    }
    if let Some(plot) = &args.plot {
        convergence.plot(plot)?;
        output::print_success(&format!("Plot written to '{}'", plot.display()));
    }
    Ok(())
}

fn run_qmc(args: ChainArgs) -> Result<()> {
    let chain = QmcChain::load(&args.input)?;
    output::print_header(&format!("QMC workflow: {}", chain.fort10.display()));

    let mut runner = LocalRunner::new(&args.work_root);
    let out = chain.run(&mut runner)?;

    print_rows(vec![
        ("VMC energy (Ha)".to_string(), out.vmc_energy.to_string()),
        ("energy (Ha)".to_string(), format!("{:.8}", out.energy)),
        ("energy_err (Ha)".to_string(), format!("{:.8}", out.energy_err)),
        ("variance square".to_string(), out.lrdmc.variance_square.to_string()),
    ]);
    Ok(())
}
