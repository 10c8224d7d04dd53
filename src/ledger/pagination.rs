// src/ledger/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Uma página de resultados, com os índices e a navegação já calculados.
///
/// `start_index` é inclusivo e `end_index` exclusivo (base zero), então
/// `end_index - start_index == items.len()` sempre.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 10)]
    pub page_size: usize,
    #[schema(example = 25)]
    pub total_items: usize,
    #[schema(example = 3)]
    pub total_pages: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub can_go_next: bool,
    pub can_go_prev: bool,
}

/// Recorta `items` na página pedida.
///
/// Página fora do intervalo (0, negativa ou além da última) é ajustada em
/// silêncio para a página válida mais próxima. `page_size` 0 vale como 1.
pub fn paginate<T: Clone>(items: &[T], page: i64, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let last_page = total_pages.max(1);
    let page = page.clamp(1, last_page as i64) as usize;

    let start_index = ((page - 1) * page_size).min(total_items);
    let end_index = (start_index + page_size).min(total_items);

    Page {
        items: items[start_index..end_index].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
        start_index,
        end_index,
        can_go_next: page < total_pages,
        can_go_prev: page > 1,
    }
}

/// Estado de navegação sobre uma lista já filtrada.
///
/// Sempre que o conteúdo recebido em `set_items` muda, volta para a página 1,
/// sem precisar de um reset explícito de quem chama.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    current_page: usize,
}

impl<T: Clone + PartialEq> Paginator<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page(&self) -> Page<T> {
        paginate(&self.items, self.current_page as i64, self.page_size)
    }

    /// Troca a lista. Conteúdo diferente (mesmo com o mesmo tamanho) volta
    /// para a página 1; a mesma lista de novo não mexe na página atual.
    pub fn set_items(&mut self, items: Vec<T>) -> Page<T> {
        if items != self.items {
            self.items = items;
            self.current_page = 1;
        }
        self.page()
    }

    pub fn go_to_page(&mut self, page: i64) -> Page<T> {
        let result = paginate(&self.items, page, self.page_size);
        self.current_page = result.page;
        result
    }

    /// Na última página não faz nada.
    pub fn go_to_next_page(&mut self) -> Page<T> {
        let current = self.page();
        if !current.can_go_next {
            return current;
        }
        self.go_to_page(self.current_page as i64 + 1)
    }

    /// Na primeira página não faz nada.
    pub fn go_to_prev_page(&mut self) -> Page<T> {
        let current = self.page();
        if !current.can_go_prev {
            return current;
        }
        self.go_to_page(self.current_page as i64 - 1)
    }
}
