//! Race tube executable entry point.
//!
//! # Architecture
//!
//! The executable runs a single batch:
//!
//!     - Load the race track named in the parameters
//!     - Run the external planner on the track
//!     - Resample the planned trajectory onto a uniform time grid
//!     - Compute the tube radius, constant or from the waypoint profile
//!     - Sweep the tube and archive it in the session directory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::info;

// Internal
use race_lib::{params::ExecParams, pipeline, planner_client::ProcessPlanner};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("race_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session, &["race_lib::tube"])
        .wrap_err("Failed to initialise logging")?;

    info!("Race Tube Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let root = host::get_race_sw_root().wrap_err("RACE_SW_ROOT is not set")?;

    let params: ExecParams = util::params::load("race_exec.toml")
        .wrap_err("Could not load exec params")?;
    let params = params.resolve(&root);

    info!("Exec parameters loaded");

    // ---- RUN ----

    let planner = ProcessPlanner::from_params(&params.planner);

    let output = pipeline::run(&params, &planner).wrap_err("The tube pipeline failed")?;

    // ---- ARCHIVE ----

    session
        .save_json("gate_outlines.json", &output.outlines)
        .wrap_err("Could not save the gate outlines")?;

    session
        .save_json("trajectory.json", &output.dense)
        .wrap_err("Could not save the sampled trajectory")?;

    let mut arch = Archiver::from_path(&session, "tube_mesh.csv")
        .wrap_err("Could not create the tube mesh archive")?;
    arch.serialise_all(output.mesh.vertex_records())
        .wrap_err("Could not archive the tube mesh")?;

    info!(
        "Archived {} tube vertices and {} triangles",
        arch.num_records(),
        output.mesh.triangles().len()
    );

    info!("End of execution");

    Ok(())
}
