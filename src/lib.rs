//! # 按需缩放图片服务 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 客户端 (GET /[exact/][WxH/]key)          │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ HTTP (Content-Type + Cache-Control 30 天)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ cli ──────── clap 参数 → ResizerConfig               │
//! │  │                                                       │
//! │  ├─ server ───── axum 路由 / healthz / 响应头            │
//! │  │                                                       │
//! │  ├─ error ────── AppError (状态码映射)                   │
//! │  │                                                       │
//! │  └─ resizer       路径解析·拉取·变换                     │
//! │      ├─ loader      GET base_url + key (reqwest)         │
//! │      └─ pipeline    GIF 校验 / 快速路径 / Lanczos2 / 编码 │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ HTTP GET
//!      源站 (origin)
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`cli`] | 命令行 / 环境变量参数，转换为已校验配置 |
//! | [`error`] | 应用级错误 `AppError`，决定对外状态码 |
//! | [`resizer`] | 请求解析、源站拉取、变换引擎与编排 |
//! | [`server`] | axum 路由、健康检查、响应头写入 |

pub mod cli;
pub mod error;
pub mod resizer;
pub mod server;
