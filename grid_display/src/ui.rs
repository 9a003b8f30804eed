// ui.rs - Playback controls and grid painter for the mesh viewer

use crate::{MeshViewer, SeedChoice};
use conway_mesh::patterns;
use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};
use std::time::{Duration, Instant};

const GRID_PIXELS: f32 = 760.0;

impl eframe::App for MeshViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_running && self.last_update.elapsed() >= self.update_interval {
            self.step_forward();
            self.last_update = Instant::now();
        }
        if self.is_running {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life on a Process Mesh");

            // Run parameters
            ui.horizontal(|ui| {
                ui.label("Grid:");
                let size_changed = ui
                    .add(egui::DragValue::new(&mut self.grid_size).clamp_range(1..=512))
                    .changed();
                if size_changed && self.seed_choice == SeedChoice::Edited {
                    self.seed_choice = SeedChoice::Pattern(0);
                }

                ui.label("Ranks:");
                ui.add(egui::DragValue::new(&mut self.processes).clamp_range(1..=64));

                ui.label("Generations:");
                ui.add(egui::DragValue::new(&mut self.generations).clamp_range(0..=5000));

                ui.separator();

                let selected = match self.seed_choice {
                    SeedChoice::Pattern(index) => patterns::PATTERNS[index].name,
                    SeedChoice::Random => "Random",
                    SeedChoice::Edited => "Edited",
                };
                egui::ComboBox::from_id_source("seed_selector")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in patterns::PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.seed_choice, SeedChoice::Pattern(i), pattern.name);
                        }
                        ui.selectable_value(&mut self.seed_choice, SeedChoice::Random, "Random");
                    });
                if self.seed_choice == SeedChoice::Random {
                    ui.label("Seed:");
                    ui.add(egui::DragValue::new(&mut self.random_seed));
                }

                if ui.button("⚙ Run").clicked() {
                    self.recompute();
                }
            });

            ui.separator();

            // Playback
            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Play" };
                if ui.button(button_text).clicked() {
                    self.is_running = !self.is_running;
                    if self.is_running {
                        self.last_update = Instant::now();
                    }
                }
                if ui.button("⏮").clicked() {
                    self.is_running = false;
                    self.step_back();
                }
                if ui.button("⏭").clicked() {
                    self.is_running = false;
                    self.step_forward();
                }

                let last = self.frame_count().saturating_sub(1);
                ui.add(egui::Slider::new(&mut self.cursor, 0..=last).text("frame"));

                ui.separator();

                ui.label("Speed:");
                let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
                if ui.add(egui::Slider::new(&mut speed, 0.5..=90.0).suffix(" gen/sec")).changed() {
                    self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
                ui.checkbox(&mut self.show_partitions, "Partitions");
                ui.color_edit_button_srgba(&mut self.boundary_color);
            });

            ui.separator();
            ui.label(self.status.as_str());
            ui.label("Click cells on frame 0 to edit the starting grid.");
            ui.separator();

            self.draw_grid(ui);
        });
    }
}

impl MeshViewer {
    fn draw_grid(&mut self, ui: &mut egui::Ui) {
        let Some(frame) = self.current() else {
            return;
        };
        let grid = &frame.grid;
        let generation = frame.generation;
        let n = grid.size();

        let spacing = if n > 128 { 0.0 } else { 0.5 };
        let box_size = (GRID_PIXELS / n as f32 - spacing).clamp(1.0, 30.0);
        let pitch = box_size + spacing;

        let start_pos = ui.cursor().min;
        let total_size = Vec2::splat(pitch * n as f32 - spacing);
        let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

        painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, Color32::BLACK);

        for (row, cells) in grid.rows().enumerate() {
            for (col, &alive) in cells.iter().enumerate() {
                let rect = Rect::from_min_size(
                    egui::pos2(start_pos.x + col as f32 * pitch, start_pos.y + row as f32 * pitch),
                    Vec2::splat(box_size),
                );
                let color = if alive { self.live_color } else { self.dead_color };
                painter.rect_filled(rect, 1.0, color);
            }
        }

        if let (true, Some(mesh)) = (self.show_partitions, self.mesh) {
            let stroke = Stroke::new(2.0, self.boundary_color);
            let (local_rows, local_cols) = (n / mesh.rows, n / mesh.cols);
            for i in 1..mesh.rows {
                let y = start_pos.y + (i * local_rows) as f32 * pitch - spacing / 2.0;
                painter.line_segment(
                    [egui::pos2(start_pos.x, y), egui::pos2(start_pos.x + total_size.x, y)],
                    stroke,
                );
            }
            for j in 1..mesh.cols {
                let x = start_pos.x + (j * local_cols) as f32 * pitch - spacing / 2.0;
                painter.line_segment(
                    [egui::pos2(x, start_pos.y), egui::pos2(x, start_pos.y + total_size.y)],
                    stroke,
                );
            }
        }

        let live_cells = grid.live_cells();
        let mut toggled = None;
        if !self.is_running && self.cursor == 0 && response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let col = ((pos.x - start_pos.x) / pitch) as usize;
                let row = ((pos.y - start_pos.y) / pitch) as usize;
                if row < n && col < n {
                    toggled = Some((row, col));
                }
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("Generation: {generation}"));
            ui.separator();
            ui.label(format!("Live cells: {live_cells}"));
            ui.separator();
            ui.label(format!("Frames: {}", self.frame_count()));
        });

        if let Some((row, col)) = toggled {
            self.toggle_start_cell(row, col);
        }
    }
}
