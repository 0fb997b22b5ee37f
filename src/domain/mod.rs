// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：schema 契约、抽取请求和抽取结果
/// - 服务（services）：校验、请求构造、模型调用和抓取流程
///
/// 领域层不关心页面如何获取，获取方式由 engines 模块的特质注入。
pub mod models;
pub mod services;
