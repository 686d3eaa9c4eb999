use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec4;
use log::info;

use crate::core::platform::driver::{GlDriver, ProgramId, TextureId};

/// Last value applied to one piece of driver state.
///
/// A slot starts uninitialized, so the first [StateSlot::apply] always
/// reaches the driver. After that, applying a value equal to the stored one
/// is a no-op.
#[derive(Debug, Clone)]
pub struct StateSlot<T> {
    current: Option<T>,
}

impl<T> Default for StateSlot<T> {
    fn default() -> Self {
        StateSlot { current: None }
    }
}

impl<T: PartialEq + Clone> StateSlot<T> {
    /// Issue `driver_call` with `value` unless the slot already holds it.
    ///
    /// Returns whether the state changed (and the driver was called).
    pub fn apply(&mut self, value: T, driver_call: impl FnOnce(&T)) -> bool {
        if self.compare(&value) {
            return false;
        }

        driver_call(&value);
        self.current = Some(value);
        true
    }

    /// Set the stored value without talking to the driver.
    ///
    /// Use it when the driver is known to be in that state already, like
    /// after deleting an object it had bound.
    pub fn init(&mut self, value: T) {
        self.current = Some(value);
    }

    /// Set the stored value and always issue `driver_call`
    pub fn force(&mut self, value: T, driver_call: impl FnOnce(&T)) {
        driver_call(&value);
        self.current = Some(value);
    }

    #[inline(always)]
    pub fn compare(&self, value: &T) -> bool {
        self.current.as_ref() == Some(value)
    }

    /// Back to uninitialized: the next apply always calls the driver
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = None;
    }

    #[inline(always)]
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

/// Texture bound on a texture unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub target: u32,
    pub texture: Option<TextureId>,
}

/// Cache of the driver state set through a [GlContext]
#[derive(Debug, Default)]
pub struct RenderState {
    pub shader_program: StateSlot<Option<ProgramId>>,
    pub texture_unit: StateSlot<u32>,
    pub textures: HashMap<u32, StateSlot<TextureBinding>>,
    pub blending: StateSlot<bool>,
    pub blending_func: StateSlot<(u32, u32)>,
    pub depth_test: StateSlot<bool>,
    pub depth_write: StateSlot<bool>,
    pub depth_func: StateSlot<u32>,
    pub culling: StateSlot<bool>,
    pub cull_face: StateSlot<u32>,
    pub clear_color: StateSlot<Vec4>,
}

impl RenderState {
    /// Unit selected by the last `active_texture`, GL starts on unit 0
    #[inline(always)]
    pub fn active_unit(&self) -> u32 {
        self.texture_unit.current().copied().unwrap_or(0)
    }
}

/// The driver plus the state cache in front of it.
///
/// Every resource (shaders, textures) keeps an `Rc` to the context it was
/// created with. The context is neither `Send` nor `Sync`: all calls must
/// come from the thread that owns the GL context, and under that rule the
/// last write always wins.
pub struct GlContext {
    driver: Rc<dyn GlDriver>,
    state: RefCell<RenderState>,
}

impl GlContext {
    pub fn new(driver: Rc<dyn GlDriver>) -> Rc<Self> {
        Rc::new(GlContext {
            driver,
            state: RefCell::new(RenderState::default()),
        })
    }

    #[inline(always)]
    pub fn driver(&self) -> &dyn GlDriver {
        self.driver.as_ref()
    }

    #[inline(always)]
    pub fn state(&self) -> Ref<'_, RenderState> {
        self.state.borrow()
    }

    /// Put the driver in a known state and record it.
    ///
    /// Every slot issues its driver call, whatever it held before. Call it
    /// once after the GL context is created, or when something outside
    /// this wrapper changed the driver state.
    pub fn initialize(&self) {
        info!("Initializing render state");
        let driver = self.driver();
        let mut state = self.state.borrow_mut();

        state
            .shader_program
            .force(None, |program| driver.use_program(*program));
        state
            .texture_unit
            .force(0, |unit| driver.active_texture(*unit));
        state.textures.clear();
        state
            .blending
            .force(false, |enabled| driver.set_capability(glow::BLEND, *enabled));
        state
            .blending_func
            .force((glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA), |(src, dst)| {
                driver.blend_func(*src, *dst)
            });
        state
            .depth_test
            .force(true, |enabled| driver.set_capability(glow::DEPTH_TEST, *enabled));
        state
            .depth_write
            .force(true, |write| driver.depth_mask(*write));
        state
            .depth_func
            .force(glow::LESS, |func| driver.depth_func(*func));
        state
            .culling
            .force(false, |enabled| driver.set_capability(glow::CULL_FACE, *enabled));
        state
            .cull_face
            .force(glow::BACK, |mode| driver.cull_face(*mode));
        state.clear_color.force(Vec4::new(0.0, 0.0, 0.0, 1.0), |c| {
            driver.clear_color(c.x, c.y, c.z, c.w)
        });
    }

    // -- < Programs > ------------------------------------------------------------------------

    pub fn use_program(&self, program: Option<ProgramId>) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .shader_program
            .apply(program, |program| driver.use_program(*program))
    }

    #[inline(always)]
    pub fn is_program_current(&self, program: ProgramId) -> bool {
        self.state.borrow().shader_program.compare(&Some(program))
    }

    /// Called after `program` was deleted. Deleting the program in use
    /// leaves the driver with no program, so record that without a call.
    pub fn forget_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.shader_program.compare(&Some(program)) {
            state.shader_program.init(None);
        }
    }

    // -- < Textures > ------------------------------------------------------------------------

    pub fn texture_unit(&self, unit: u32) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .texture_unit
            .apply(unit, |unit| driver.active_texture(*unit))
    }

    /// Bind `texture` on the active texture unit
    pub fn bind_texture(&self, target: u32, texture: Option<TextureId>) -> bool {
        let driver = self.driver();
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit();

        state
            .textures
            .entry(unit)
            .or_default()
            .apply(TextureBinding { target, texture }, |binding| {
                driver.bind_texture(binding.target, binding.texture)
            })
    }

    /// Called after `texture` was deleted: the driver unbinds it from every
    /// unit on its own.
    pub fn forget_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();

        for slot in state.textures.values_mut() {
            if let Some(binding) = slot.current().copied() {
                if binding.texture == Some(texture) {
                    slot.init(TextureBinding {
                        target: binding.target,
                        texture: None,
                    });
                }
            }
        }
    }

    // -- < Fixed function state > ------------------------------------------------------------

    pub fn blending(&self, enabled: bool) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .blending
            .apply(enabled, |enabled| driver.set_capability(glow::BLEND, *enabled))
    }

    pub fn blending_func(&self, src: u32, dst: u32) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .blending_func
            .apply((src, dst), |(src, dst)| driver.blend_func(*src, *dst))
    }

    pub fn depth_test(&self, enabled: bool) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .depth_test
            .apply(enabled, |enabled| {
                driver.set_capability(glow::DEPTH_TEST, *enabled)
            })
    }

    pub fn depth_write(&self, write: bool) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .depth_write
            .apply(write, |write| driver.depth_mask(*write))
    }

    pub fn depth_func(&self, func: u32) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .depth_func
            .apply(func, |func| driver.depth_func(*func))
    }

    pub fn culling(&self, enabled: bool) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .culling
            .apply(enabled, |enabled| driver.set_capability(glow::CULL_FACE, *enabled))
    }

    pub fn cull_face(&self, mode: u32) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .cull_face
            .apply(mode, |mode| driver.cull_face(*mode))
    }

    pub fn clear_color(&self, color: Vec4) -> bool {
        let driver = self.driver();
        self.state
            .borrow_mut()
            .clear_color
            .apply(color, |c| driver.clear_color(c.x, c.y, c.z, c.w))
    }
}
