use crate::scene::MaterialKind;

/// Pipeline state objects known to the renderer, resolved by enum rather
/// than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Terrain,
    Ui,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetViewport {
        width: f32,
        height: f32,
    },
    Clear {
        color: [f32; 4],
    },
    SetPipeline(PipelineKind),
    /// Byte offsets are relative to the current frame resource's buffers.
    BindPassConstants {
        frame: usize,
        offset: usize,
    },
    DrawTerrain {
        frame: usize,
        object_offset: usize,
        material: MaterialKind,
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
    /// One instanced quad per UI record, `first..first + count`.
    DrawUiQuads {
        frame: usize,
        first: u32,
        count: u32,
    },
}

/// Per-frame command memory. Resetting is only legal once the GPU has
/// finished with everything recorded since the previous reset.
pub trait CommandAllocator {
    fn reset(&mut self);
    fn record(&mut self, command: DrawCommand);
    fn commands(&self) -> &[DrawCommand];
}

/// Recorded draw stream, replayed by an external renderer.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    commands: Vec<DrawCommand>,
    resets: u64,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl CommandAllocator for CommandList {
    fn reset(&mut self) {
        self.commands.clear();
        self.resets += 1;
    }

    fn record(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}
