use fractal_core::config::{FractalConfig, GraphConfig, TransitionMode};
use fractal_core::graph::cpu::Graph;
use fractal_core::graph::functions::FunctionName;
use fractal_core::graph::gpu::{GpuGraph, GraphDispatch};
use fractal_core::render::{Bounds, Renderer};
use fractal_core::{Fractal, PackedMatrix};
use wasm_bindgen::prelude::*;

fn js_error(err: fractal_core::FractalError) -> JsError {
    JsError::new(&err.to_string())
}

fn random_seed() -> u32 {
    let mut bytes = [0u8; 4];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u32::from_le_bytes(bytes),
        Err(_) => js_sys::Date::now() as u32,
    }
}

fn transition_mode(mode: u32) -> TransitionMode {
    match mode {
        1 => TransitionMode::Random,
        _ => TransitionMode::Cycle,
    }
}

/// Per-level instance buffers read by the JS renderer.
///
/// JS uploads the bytes at `level_buffer_ptr(level)` into that level's storage buffer and
/// issues one instanced draw of `instance_count` copies.
#[derive(Default)]
struct LevelBuffers {
    buffers: Vec<Vec<PackedMatrix>>,
    instance_counts: Vec<usize>,
}

impl Renderer for LevelBuffers {
    fn allocate_level_buffer(&mut self, level: usize, count: usize) {
        if self.buffers.len() <= level {
            self.buffers.resize_with(level + 1, Vec::new);
            self.instance_counts.resize(level + 1, 0);
        }
        self.buffers[level] = vec![PackedMatrix::default(); count];
        self.instance_counts[level] = 0;
    }

    fn release_level_buffers(&mut self) {
        self.buffers.clear();
        self.instance_counts.clear();
    }

    fn upload_and_draw(
        &mut self,
        level: usize,
        matrices: &[PackedMatrix],
        instance_count: usize,
        _bounds: Bounds,
    ) {
        if let Some(buffer) = self.buffers.get_mut(level) {
            let n = buffer.len().min(matrices.len());
            buffer[..n].copy_from_slice(&matrices[..n]);
            self.instance_counts[level] = instance_count.min(n);
        }
    }
}

#[wasm_bindgen]
pub struct FractalWorld {
    fractal: Fractal,
    buffers: LevelBuffers,
}

#[wasm_bindgen]
impl FractalWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(depth: usize) -> Result<FractalWorld, JsError> {
        let fractal = Fractal::new(FractalConfig::with_depth(depth)).map_err(js_error)?;
        web_sys::console::log_1(
            &format!(
                "WASM FractalWorld created: depth {} ({} parts)",
                depth,
                fractal.store().total_parts()
            )
            .into(),
        );

        let mut world = FractalWorld {
            fractal,
            buffers: LevelBuffers::default(),
        };
        world.fractal.allocate_buffers(&mut world.buffers);
        world.fractal.advance_frame(0.0);
        world.fractal.render(&mut world.buffers);
        Ok(world)
    }

    /// Advance by `dt` seconds and refresh every level buffer. Returns the
    /// time spent in milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32) -> f32 {
        let start = js_sys::Date::now();
        self.fractal.update(dt);
        self.fractal.render(&mut self.buffers);
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    /// Rebuild for a new depth. Throws on an unsupported depth and keeps the
    /// current fractal.
    #[wasm_bindgen]
    pub fn set_depth(&mut self, depth: usize) -> Result<(), JsError> {
        self.fractal.set_depth(depth).map_err(js_error)?;
        self.fractal.allocate_buffers(&mut self.buffers);
        self.fractal.advance_frame(0.0);
        self.fractal.render(&mut self.buffers);
        web_sys::console::log_1(&format!("WASM FractalWorld depth set to {}", depth).into());
        Ok(())
    }

    #[wasm_bindgen]
    pub fn level_count(&self) -> usize {
        self.buffers.buffers.len()
    }

    #[wasm_bindgen]
    pub fn level_instance_count(&self, level: usize) -> usize {
        self.buffers.instance_counts.get(level).copied().unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn level_buffer_ptr(&self, level: usize) -> *const f32 {
        self.buffers
            .buffers
            .get(level)
            .map_or(std::ptr::null(), |buffer| buffer.as_ptr() as *const f32)
    }

    #[wasm_bindgen]
    pub fn level_buffer_byte_length(&self, level: usize) -> usize {
        self.buffers
            .buffers
            .get(level)
            .map_or(0, |buffer| bytemuck::cast_slice::<PackedMatrix, u8>(buffer).len())
    }

    /// Edge length of the cube bounding the whole fractal.
    #[wasm_bindgen]
    pub fn bounds_size(&self) -> f32 {
        self.fractal.bounds().size.x
    }
}

/// CPU-evaluated point graph.
#[wasm_bindgen]
pub struct GraphWorld {
    graph: Graph,
}

#[wasm_bindgen]
impl GraphWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(resolution: u32) -> Result<GraphWorld, JsError> {
        let config = GraphConfig {
            resolution,
            ..GraphConfig::default()
        };
        let graph = Graph::new(&config, random_seed()).map_err(js_error)?;
        web_sys::console::log_1(
            &format!("WASM GraphWorld created: {}x{} points", resolution, resolution).into(),
        );
        Ok(GraphWorld { graph })
    }

    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32, time: f32) -> f32 {
        let start = js_sys::Date::now();
        self.graph.update(dt, time);
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    #[wasm_bindgen]
    pub fn positions_ptr(&self) -> *const f32 {
        self.graph.positions().as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn positions_byte_length(&self) -> usize {
        bytemuck::cast_slice::<glam::Vec3, u8>(self.graph.positions()).len()
    }

    #[wasm_bindgen]
    pub fn point_count(&self) -> usize {
        self.graph.positions().len()
    }

    #[wasm_bindgen]
    pub fn point_scale(&self) -> f32 {
        self.graph.point_scale()
    }

    #[wasm_bindgen]
    pub fn set_function(&mut self, function: u32) {
        self.graph.set_function(FunctionName::from_index(function));
    }

    /// `0` cycles through the functions, `1` picks them at random.
    #[wasm_bindgen]
    pub fn set_transition_mode(&mut self, mode: u32) {
        self.graph.set_transition_mode(transition_mode(mode));
    }
}

/// Point graph computed by a WebGPU compute pass.
///
/// `step` refreshes the uniforms JS writes before dispatching
/// `kernel_index` over `groups x groups` work groups.
#[wasm_bindgen]
pub struct GpuGraphWorld {
    graph: GpuGraph,
    dispatch: GraphDispatch,
}

#[wasm_bindgen]
impl GpuGraphWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(resolution: u32) -> Result<GpuGraphWorld, JsError> {
        let config = GraphConfig {
            resolution,
            ..GraphConfig::default()
        };
        let mut graph = GpuGraph::new(&config, random_seed()).map_err(js_error)?;
        let dispatch = graph.prepare(0.0, 0.0);
        web_sys::console::log_1(
            &format!("WASM GpuGraphWorld created: resolution {}", resolution).into(),
        );
        Ok(GpuGraphWorld { graph, dispatch })
    }

    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32, time: f32) {
        self.dispatch = self.graph.prepare(dt, time);
    }

    #[wasm_bindgen]
    pub fn set_function(&mut self, function: u32) {
        self.graph.set_function(FunctionName::from_index(function));
    }

    #[wasm_bindgen]
    pub fn set_resolution(&mut self, resolution: u32) -> Result<(), JsError> {
        self.graph.set_resolution(resolution).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn set_transition_mode(&mut self, mode: u32) {
        self.graph.set_transition_mode(transition_mode(mode));
    }

    #[wasm_bindgen]
    pub fn kernel_index(&self) -> u32 {
        self.dispatch.kernel_index
    }

    #[wasm_bindgen]
    pub fn resolution(&self) -> u32 {
        self.dispatch.resolution
    }

    #[wasm_bindgen]
    pub fn step_size(&self) -> f32 {
        self.dispatch.step
    }

    #[wasm_bindgen]
    pub fn time(&self) -> f32 {
        self.dispatch.time
    }

    #[wasm_bindgen]
    pub fn transition_progress(&self) -> f32 {
        self.dispatch.transition_progress
    }

    #[wasm_bindgen]
    pub fn groups(&self) -> u32 {
        self.dispatch.groups[0]
    }

    #[wasm_bindgen]
    pub fn instance_count(&self) -> u32 {
        self.dispatch.instance_count()
    }

    #[wasm_bindgen]
    pub fn bounds_size(&self) -> f32 {
        self.dispatch.bounds().size.x
    }
}
