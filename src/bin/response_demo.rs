//! Response demo - drives a few synthetic load steps through buffer and commit
//!
//! Usage: `response-demo [run.json]`, where the file holds `{ "mesh": ..., "options": ... }`.
//! Without a file a small mixed frame/shell mesh is used.

use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;

use fea_response::prelude::*;

const STEPS: usize = 3;
const ITERATIONS_PER_STEP: usize = 2;

#[derive(Debug, Deserialize)]
struct RunInput {
    mesh: Mesh,
    #[serde(default)]
    options: AnalysisOptions,
}

fn demo_mesh() -> Result<Mesh> {
    let mut mesh = Mesh::new(6, 4);
    mesh.add_attribute("column", ElementAttribute::new("FRAME_3D"))?;
    mesh.add_attribute(
        "slab",
        ElementAttribute::new("SHELL_4N").with_hardening_curve("bilinear"),
    )?;

    mesh.add_element(Element::new("column").with_nodes(&[1, 2]))?;
    mesh.add_element(Element::new("column").with_nodes(&[3, 4]))?;
    mesh.add_element(Element::new("slab").with_nodes(&[2, 4, 6, 5]))?;
    mesh.add_element(Element::new("slab").with_nodes(&[5, 6, 8, 7]))?;
    Ok(mesh)
}

fn load_input() -> Result<RunInput> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("failed to parse {path}"))
        }
        None => Ok(RunInput {
            mesh: demo_mesh()?,
            options: AnalysisOptions::default()
                .with_units(UnitSystem::Si)
                .with_logging(),
        }),
    }
}

/// Stand-in for an element routine: load grows with the step, and
/// shells yield once the stress passes 250 MPa.
fn evaluate(
    session: &AnalysisSession,
    element: usize,
    step: usize,
    iteration: usize,
) -> Result<ElementEvaluation> {
    let mut eval = session
        .evaluation(element)
        .with_context(|| format!("no evaluation template for element {element}"))?;
    let factor = (step + 1) as f64 + 0.1 * iteration as f64;

    for (i, load) in eval.nodal_loads.iter_mut().enumerate() {
        *load = factor * (element * 10 + i) as f64;
    }

    let stress = 1.0e8 * factor;
    eval.stress.fill(0.0);
    for point in 0..eval.integration_points() {
        eval.stress[(0, point)] = stress;
        eval.stress[(4, point)] = 0.5 * stress;
    }

    if eval.family.is_shell() && stress > 2.5e8 {
        eval.state = ElementState::Plastic;
        eval.effective_plastic_strain_increment.fill(1.0e-4 * factor);
        eval.plastic_strain_increment.fill(5.0e-5 * factor);
        eval.hardening.r.fill(2.5e8);
        eval.hardening.h.fill(2.0e9);
    }
    Ok(eval)
}

fn main() -> Result<()> {
    env_logger::init();

    let input = load_input()?;
    let mut session =
        AnalysisSession::new(input.mesh, input.options).context("response allocation failed")?;

    if session.buffer().is_none() {
        log::warn!("no response buffer for this mesh; nothing to drive");
        println!("{}", session.responses_json()?);
        return Ok(());
    }

    let elements = session.mesh().element_count();
    for step in 0..STEPS {
        for iteration in 0..ITERATIONS_PER_STEP {
            let evals = (1..=elements)
                .map(|element| evaluate(&session, element, step, iteration))
                .collect::<Result<Vec<_>>>()?;
            session
                .record_evaluations(&evals)
                .with_context(|| format!("write failed in step {step}"))?;
        }
        let summary = session
            .commit_step()
            .with_context(|| format!("commit failed in step {step}"))?;
        log::info!("step {}: {} elements committed", step + 1, summary.total());
    }

    for (index, response) in session.responses().iter().enumerate() {
        let peak_stress = (0..response.integration_points())
            .filter_map(|point| response.von_mises(point))
            .fold(0.0, f64::max);
        log::info!(
            "element {}: {:?}, von Mises {:.3e}, max effective plastic strain {:.3e}",
            index + 1,
            response.state,
            peak_stress,
            response.max_effective_plastic_strain()
        );
    }

    println!("{}", session.responses_json()?);
    Ok(())
}
