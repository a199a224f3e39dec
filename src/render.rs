//! Frame rendering.
//!
//! One render pass per frame: the ground grid first, then every mesh slot of
//! the jersey with the material currently assigned to it. Each slot draws a
//! single instance out of the model's instance buffer.

use std::iter;

use crate::{
    context::Context,
    data_structures::{model::DrawModel, scene_graph::collect_mesh_slots},
    viewer::Viewer,
};

impl Context {
    pub fn render(&mut self, viewer: &Viewer) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(viewer);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipelines.grid);
            render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.grid.vertex_buffer.slice(..));
            render_pass.draw(0..self.grid.num_vertices, 0..1);

            if let (Some(gpu_model), Some(jersey)) = (&self.model, viewer.jersey()) {
                render_pass.set_pipeline(&self.pipelines.model);
                render_pass.set_vertex_buffer(1, gpu_model.instance_buffer.slice(..));
                for (slot, _) in collect_mesh_slots(jersey.root()) {
                    let Some(mesh) = gpu_model.meshes.get(slot.mesh) else {
                        continue;
                    };
                    render_pass.draw_mesh_instanced(
                        mesh,
                        self.material(slot.material),
                        slot.instance..slot.instance + 1,
                        &self.camera.bind_group,
                        &self.light.bind_group,
                    );
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
