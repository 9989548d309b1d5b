use clap::Parser;
use log::info;
use voronoi_amr::amr::{
    Amr, AmrConfig, ConservativeAmr, ConservativeAmrOld, PlacementScheme, Simulation, ThresholdRefine,
    ThresholdRemove,
};
use voronoi_amr::geometry::Vector2d;
use voronoi_amr::hydro::{ComputationalCell, Extensive, Field, IdealGas};
use voronoi_amr::tessellation::{BinLogger, OuterBoundary, VoronoiMesh};




#[derive(Debug, Parser)]
#[clap(version = "1.0", about = "Adaptive refinement of a blast wave profile on a Voronoi mesh")]
struct Opts {
    #[clap(short = 'n', long, default_value_t = 32)]
    resolution: usize,

    #[clap(short = 's', long, default_value_t = 4)]
    passes: usize,

    #[clap(short = 'p', long)]
    periodic: bool,

    #[clap(long)]
    arepo: bool,

    #[clap(long)]
    piecewise_constant: bool,

    #[clap(long, default_value = "voronoi.bin")]
    mesh_file: String,

    #[clap(short = 'o', long, default_value = "state.cbor")]
    output: String,
}




#[derive(serde::Serialize)]
struct State<'a> {
    time: f64,
    points: Vec<Vector2d>,
    volumes: Vec<f64>,
    cells: &'a [ComputationalCell],
    extensives: &'a [Extensive],
}




// ============================================================================
fn blast_profile(p: Vector2d) -> ComputationalCell {
    let r2 = (p - Vector2d::new(0.5, 0.5)).dot(p - Vector2d::new(0.5, 0.5));
    let pressure = 1e-2 + 1e2 * (-r2 / 0.005).exp();
    ComputationalCell::new(1.0, pressure, Vector2d::default()).with_tracer("ejecta", (-r2 / 0.01).exp())
}

fn initial_points(n: usize) -> Vec<Vector2d> {
    let dx = 1.0 / n as f64;
    (0..n * n)
        .map(|k| Vector2d::new((k % n) as f64 + 0.5, (k / n) as f64 + 0.5) * dx)
        .collect()
}

fn report(pass: usize, sim: &Simulation) {
    let total = sim.total_extensive();
    println!(
        "[{}] points={} mass={:.12} energy={:.12} momentum=({:.3e}, {:.3e})",
        pass,
        sim.tess.point_count(),
        total.mass,
        total.energy,
        total.momentum.x,
        total.momentum.y
    );
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    let opts = Opts::parse();
    info!("{:?}", opts);

    let (lower, upper) = (Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
    let boundary = if opts.periodic {
        OuterBoundary::periodic(lower, upper)
    } else {
        OuterBoundary::rigid(lower, upper)
    };

    let points = initial_points(opts.resolution);
    let cells = points.iter().map(|&p| blast_profile(p)).collect();
    let mesh = VoronoiMesh::new(points, boundary.clone())?;
    let mut sim = Simulation::new(Box::new(mesh), boundary, cells, Box::new(IdealGas::new(5.0 / 3.0)))?;

    let cell_volume = 1.0 / (opts.resolution * opts.resolution) as f64;
    let refine = ThresholdRefine {
        field: Field::Pressure,
        threshold: 1.0,
        min_volume: 0.2 * cell_volume,
    };
    let remove = ThresholdRemove {
        field: Field::Pressure,
        threshold: 2e-2,
        max_volume: 1.5 * cell_volume,
    };
    let config = AmrConfig {
        placement: if opts.arepo { PlacementScheme::Arepo } else { PlacementScheme::FarthestNeighbor },
        ..AmrConfig::default()
    };

    let amr: Box<dyn Amr> = if opts.piecewise_constant {
        Box::new(ConservativeAmrOld::new(refine, remove).with_config(&config))
    } else {
        Box::new(ConservativeAmr::new(refine, remove).with_config(&config))
    };

    report(0, &sim);

    for pass in 1..=opts.passes {
        amr.step(&mut sim)?;
        sim.time += 1.0;
        report(pass, &sim);
    }

    BinLogger::new(&opts.mesh_file).output(sim.tess.as_ref())?;

    let state = State {
        time: sim.time,
        points: sim.tess.mesh_points(),
        volumes: (0..sim.tess.point_count()).map(|i| sim.tess.volume(i)).collect(),
        cells: &sim.cells,
        extensives: &sim.extensives,
    };
    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&state, &mut buffer)?;
    info!("write {}", opts.output);

    Ok(())
}
