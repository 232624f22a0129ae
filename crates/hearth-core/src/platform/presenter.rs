// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the abstract `FramePresenter` trait.

use crate::module::Framebuffer;
use anyhow::Result;

/// Puts a finished framebuffer on screen.
pub trait FramePresenter {
    /// Displays `frame`. Called once per frame, after pacing.
    fn present(&mut self, frame: &Framebuffer) -> Result<()>;

    /// Switches between windowed and fullscreen display.
    fn set_fullscreen(&mut self, fullscreen: bool);
}

/// A presenter that discards every frame.
#[derive(Debug, Default)]
pub struct NullPresenter {
    presented: u64,
}

impl NullPresenter {
    /// Number of frames handed to this presenter.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl FramePresenter for NullPresenter {
    fn present(&mut self, _frame: &Framebuffer) -> Result<()> {
        self.presented += 1;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        log::debug!("NullPresenter: fullscreen = {fullscreen}");
    }
}
